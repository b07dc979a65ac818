use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::config::WindowConfig;
use crate::error::Result;
use crate::events::Tick;
use crate::observability::metrics::{SYMBOLS_TRACKED, TICKS_APPLIED, TICKS_REJECTED};
use crate::ranking::{RestorePoint, SnapshotProvider};
use crate::types::Symbol;
use crate::window::{RollingWindowStore, StoreReader};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregatorStats {
    pub applied: u64,
    pub rejected: u64,
}

/// Sole writer of symbol state.
///
/// Consumes ticks from the feed and applies the window update for each one.
/// Everything else sees the state through [`StoreReader`] or
/// [`SnapshotProvider`].
pub struct Aggregator {
    store: RollingWindowStore,
    universe: Option<HashSet<Symbol>>,
    stats: AggregatorStats,
}

impl Aggregator {
    pub fn new(geometry: WindowConfig) -> Result<Self> {
        Ok(Aggregator {
            store: RollingWindowStore::new(geometry)?,
            universe: None,
            stats: AggregatorStats::default(),
        })
    }

    /// Restrict restored state to the subscribed symbols.
    pub fn with_universe(mut self, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        self.universe = Some(symbols.into_iter().collect());
        self
    }

    pub fn reader(&self) -> StoreReader {
        self.store.reader()
    }

    pub fn provider(&self) -> SnapshotProvider {
        SnapshotProvider::new(self.store.reader())
    }

    pub fn stats(&self) -> &AggregatorStats {
        &self.stats
    }

    /// Apply one tick. Rejected ticks leave state untouched.
    pub fn apply(&mut self, tick: &Tick) -> Result<()> {
        match self.store.update(&tick.symbol, tick.price, tick.event_time) {
            Ok(()) => {
                self.stats.applied += 1;
                TICKS_APPLIED.inc();
                SYMBOLS_TRACKED.set(self.store.reader().len() as i64);
                Ok(())
            }
            Err(e) => {
                self.stats.rejected += 1;
                TICKS_REJECTED.inc();
                Err(e)
            }
        }
    }

    /// Seed persisted metrics before live ticks arrive.
    ///
    /// Only the headline metrics are restored; sample history and buckets
    /// start empty. Returns how many symbols were seeded.
    pub fn restore(&mut self, points: &[RestorePoint]) -> usize {
        let mut seeded = 0;
        for point in points {
            if let Some(universe) = &self.universe {
                if !universe.contains(&point.symbol) {
                    tracing::debug!("Skipping restore for unsubscribed symbol {}", point.symbol);
                    continue;
                }
            }
            if self.store.seed(
                &point.symbol,
                point.current_rate_change,
                point.window_average_rate_change,
            ) {
                seeded += 1;
            }
        }
        SYMBOLS_TRACKED.set(self.store.reader().len() as i64);
        tracing::info!("Restored {} of {} persisted symbols", seeded, points.len());
        seeded
    }

    /// Consume ticks until the feed ends or shutdown fires.
    ///
    /// On shutdown the channel is closed and ticks already queued are still
    /// applied before returning.
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<Tick>,
        shutdown: CancellationToken,
    ) -> AggregatorStats {
        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => None,
                tick = rx.recv() => tick,
            };
            let Some(tick) = next else {
                break;
            };
            self.apply_logged(&tick);
        }

        rx.close();
        while let Some(tick) = rx.recv().await {
            self.apply_logged(&tick);
        }

        tracing::info!(
            "Aggregator stopped: {} ticks applied, {} rejected",
            self.stats.applied,
            self.stats.rejected
        );
        self.stats
    }

    fn apply_logged(&mut self, tick: &Tick) {
        if let Err(e) = self.apply(tick) {
            tracing::warn!("Rejected tick for {}: {}", tick.symbol, e);
        }
    }
}
