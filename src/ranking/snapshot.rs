use serde::{Deserialize, Serialize};
use crate::types::{Symbol, Timestamp};
use crate::window::SeriesMetrics;

/// Immutable copy of every symbol's metrics at `taken_at`, sorted by symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub taken_at: Timestamp,
    pub entries: Vec<(Symbol, SeriesMetrics)>,
}

impl MetricsSnapshot {
    pub fn get(&self, symbol: &Symbol) -> Option<&SeriesMetrics> {
        self.entries
            .binary_search_by(|(s, _)| s.cmp(symbol))
            .ok()
            .map(|index| &self.entries[index].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Persisted partial state used to pre-seed a symbol at startup.
///
/// Only the two headline metrics survive a restart; sample history and
/// buckets are rebuilt from live ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestorePoint {
    pub symbol: Symbol,
    pub current_rate_change: Option<f64>,
    pub window_average_rate_change: Option<f64>,
}
