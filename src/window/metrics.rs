use serde::{Deserialize, Serialize};
use crate::types::Timestamp;

/// Point-in-time copy of one symbol's derived statistics.
///
/// `None` means "no data" and is never conflated with a zero change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetrics {
    pub last_price: Option<f64>,
    pub last_update: Option<Timestamp>,
    pub sample_count: usize,
    pub current_rate_change: Option<f64>,
    pub window_average_rate_change: Option<f64>,
    pub bucket_rate_change: Vec<Option<f64>>,
}

impl SeriesMetrics {
    pub fn bucket(&self, index: usize) -> Option<f64> {
        self.bucket_rate_change.get(index).copied().flatten()
    }
}
