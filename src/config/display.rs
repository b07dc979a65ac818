use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::ranking::MetricSelector;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    pub top_n: usize,
    pub rank_by: MetricSelector,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            enabled: true,
            interval_ms: 3_000,
            top_n: 60,
            rank_by: MetricSelector::CurrentRateChange,
        }
    }
}

impl DisplayConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
