pub mod display;
pub mod export;

use std::time::Duration;
use async_trait::async_trait;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use crate::error::Result;

pub use display::{DisplayTable, DisplayTask};
pub use export::ExportTask;

/// A read-only job run on a fixed period.
#[async_trait]
pub trait PeriodicTask: Send {
    fn name(&self) -> &str;
    fn period(&self) -> Duration;

    /// Run once at start instead of waiting a full period.
    fn run_immediately(&self) -> bool {
        false
    }

    async fn run_once(&mut self) -> Result<()>;
}

/// Tick `task` until `shutdown` fires. Failures are logged and the next
/// period runs as normal; a run in progress completes before exit.
pub async fn run_periodic<T: PeriodicTask>(mut task: T, shutdown: CancellationToken) {
    let period = task.period();
    let start = if task.run_immediately() {
        Instant::now()
    } else {
        Instant::now() + period
    };
    let mut ticker = interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!("Started periodic task {} every {:?}", task.name(), period);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if let Err(e) = task.run_once().await {
            tracing::error!("Periodic task {} failed: {}", task.name(), e);
        }
    }

    tracing::info!("Stopped periodic task {}", task.name());
}
