use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::events::Tick;
use crate::observability::metrics::{DECODE_ERRORS, FEED_RECONNECTS};
use crate::observability::tracing::feed_connection_span;
use crate::price_infra::connectors::binance::BinanceConnector;
use crate::price_infra::connectors::PriceConnector;
use crate::price_infra::reconnect::ReconnectPolicy;
use crate::types::Symbol;
use crate::utils::task_supervisor::TaskSupervisor;

/// Counters for one connection's lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub ticks_delivered: u64,
    pub decode_errors: u64,
    pub reconnects: u64,
    pub connect_failures: u64,
}

/// Subscribes the symbol universe and turns upstream messages into a tick
/// stream.
///
/// The universe is split into groups of `max_streams_per_connection`; each
/// group gets its own connection and reconnect loop, all feeding a single
/// channel. Ticks from one connection arrive in the order received; there
/// is no ordering across connections or across a reconnect.
pub struct FeedConnector {
    config: FeedConfig,
    symbols: Vec<Symbol>,
}

impl FeedConnector {
    pub fn new(config: FeedConfig, mut symbols: Vec<Symbol>) -> Result<Self> {
        symbols.sort();
        symbols.dedup();
        if symbols.is_empty() {
            return Err(Error::EmptySymbolSet);
        }
        if config.max_streams_per_connection == 0 {
            return Err(Error::ConfigError(
                "max_streams_per_connection must be positive".to_string(),
            ));
        }
        Ok(FeedConnector { config, symbols })
    }

    /// Symbol groups, one per upstream connection.
    pub fn connection_plan(&self) -> Vec<Vec<Symbol>> {
        self.symbols
            .chunks(self.config.max_streams_per_connection)
            .map(<[Symbol]>::to_vec)
            .collect()
    }

    /// Spawn one supervised task per connection and return the tick stream.
    ///
    /// The stream ends once every connection task has stopped, which only
    /// happens after the supervisor's shutdown token fires.
    pub fn subscribe(self, supervisor: &mut TaskSupervisor) -> mpsc::Receiver<Tick> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        let shutdown = supervisor.token();

        for (index, group) in self.connection_plan().into_iter().enumerate() {
            let connector = BinanceConnector::new(&self.config.url, &self.config.stream, &group);
            let policy = ReconnectPolicy::new(&self.config.reconnect);
            let span = feed_connection_span(index, group.len());
            let task = run_connection(connector, policy, tx.clone(), shutdown.clone());

            supervisor.spawn(format!("feed-{}", index), async move {
                let stats = task.instrument(span).await;
                tracing::info!("Feed connection {} stopped: {:?}", index, stats);
            });
        }

        rx
    }
}

/// Drive one connection until shutdown or until the receiver goes away.
///
/// Decode failures drop the offending message only. Any other failure
/// triggers a backoff delay and a fresh `connect`. Nothing is replayed
/// after a reconnect.
pub async fn run_connection<C: PriceConnector>(
    mut connector: C,
    mut policy: ReconnectPolicy,
    tx: mpsc::Sender<Tick>,
    shutdown: CancellationToken,
) -> FeedStats {
    let mut stats = FeedStats::default();

    'session: loop {
        let connected = tokio::select! {
            _ = shutdown.cancelled() => break 'session,
            result = connector.connect() => result,
        };

        if let Err(e) = connected {
            stats.connect_failures += 1;
            let delay = policy.next_delay();
            tracing::warn!(
                "{} connect failed (attempt {}): {}, retrying in {:?}",
                connector.source_id(),
                policy.attempts(),
                e,
                delay
            );
            if !sleep_or_shutdown(delay, &shutdown).await {
                break 'session;
            }
            continue;
        }
        policy.reset();

        loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => None,
                result = connector.next_tick() => Some(result),
            };
            let Some(next) = next else {
                connector.close().await;
                break 'session;
            };

            match next {
                Ok(tick) => {
                    if tx.send(tick).await.is_err() {
                        tracing::info!("Tick receiver dropped, closing {}", connector.source_id());
                        connector.close().await;
                        break 'session;
                    }
                    stats.ticks_delivered += 1;
                }
                Err(e) if e.is_decode() => {
                    stats.decode_errors += 1;
                    DECODE_ERRORS.inc();
                    tracing::warn!("Skipping undecodable message from {}: {}", connector.source_id(), e);
                }
                Err(e) => {
                    stats.reconnects += 1;
                    FEED_RECONNECTS.inc();
                    if e.is_transient() {
                        tracing::warn!("{} connection lost: {}, reconnecting", connector.source_id(), e);
                    } else {
                        tracing::error!("Unexpected error from {}: {}, reconnecting", connector.source_id(), e);
                    }
                    connector.close().await;
                    break;
                }
            }
        }

        let delay = policy.next_delay();
        if !sleep_or_shutdown(delay, &shutdown).await {
            break 'session;
        }
    }

    stats
}

/// Returns false if shutdown fired before the delay elapsed.
async fn sleep_or_shutdown(delay: std::time::Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
