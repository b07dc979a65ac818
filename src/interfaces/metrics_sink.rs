use async_trait::async_trait;
use crate::error::Result;
use crate::persistence::batch::ExportBatch;
use crate::ranking::RestorePoint;

/// Time-series persistence for exported metrics.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn write_batch(&self, batch: &ExportBatch) -> Result<()>;

    /// Most recent persisted headline metrics per symbol.
    async fn load_latest(&self) -> Result<Vec<RestorePoint>>;
}
