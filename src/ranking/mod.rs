pub mod snapshot;
pub mod top_n;

pub use snapshot::{MetricsSnapshot, RestorePoint};
pub use top_n::{MetricSelector, RankedSymbol};

use crate::types::Timestamp;
use crate::window::StoreReader;

/// Read path over the rolling window store: ranking and snapshots.
///
/// Restoring persisted state is a write and goes through
/// [`Aggregator::restore`](crate::price_infra::aggregator::Aggregator::restore).
#[derive(Clone)]
pub struct SnapshotProvider {
    reader: StoreReader,
}

impl SnapshotProvider {
    pub fn new(reader: StoreReader) -> Self {
        SnapshotProvider { reader }
    }

    pub fn top_n(&self, selector: MetricSelector, n: usize) -> Vec<RankedSymbol> {
        top_n::rank(self.reader.all_metrics(), selector, n)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            taken_at: Timestamp::now(),
            entries: self.reader.all_metrics(),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.reader.bucket_count()
    }
}
