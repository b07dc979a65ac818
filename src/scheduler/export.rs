use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use tracing::Instrument;
use crate::error::Result;
use crate::interfaces::MetricsSink;
use crate::observability::metrics::{EXPORTS_FAILED, EXPORTS_WRITTEN};
use crate::observability::tracing::export_span;
use crate::persistence::ExportBatch;
use crate::ranking::SnapshotProvider;
use crate::scheduler::PeriodicTask;
use crate::types::Timestamp;

/// Writes one batch per period. A failed batch is dropped; the next period
/// exports fresh state instead of retrying.
pub struct ExportTask {
    provider: SnapshotProvider,
    sink: Arc<dyn MetricsSink>,
    period: Duration,
}

impl ExportTask {
    pub fn new(provider: SnapshotProvider, sink: Arc<dyn MetricsSink>, period: Duration) -> Self {
        ExportTask { provider, sink, period }
    }
}

#[async_trait]
impl PeriodicTask for ExportTask {
    fn name(&self) -> &str {
        "export"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn run_once(&mut self) -> Result<()> {
        let snapshot = self.provider.snapshot();
        if snapshot.is_empty() {
            tracing::debug!("Nothing to export");
            return Ok(());
        }

        let batch = ExportBatch::from_snapshot(&snapshot, Timestamp::now());
        let span = export_span(batch.points.len());

        match self.sink.write_batch(&batch).instrument(span).await {
            Ok(()) => {
                EXPORTS_WRITTEN.inc();
                Ok(())
            }
            Err(e) => {
                EXPORTS_FAILED.inc();
                Err(e)
            }
        }
    }
}
