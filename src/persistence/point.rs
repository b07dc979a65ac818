use serde::{Deserialize, Serialize};
use crate::ranking::RestorePoint;
use crate::types::{Symbol, Timestamp};
use crate::window::SeriesMetrics;

pub const MEASUREMENT: &str = "symbol_rate_change";

/// One exported point per symbol, tagged by symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportPoint {
    pub symbol: Symbol,
    pub avg_rate_change: Option<f64>,
    pub current_rate_change: Option<f64>,
    pub hourly_avg_change: Vec<Option<f64>>,
    pub timestamp: Timestamp,
}

impl ExportPoint {
    pub fn from_metrics(symbol: Symbol, metrics: &SeriesMetrics, timestamp: Timestamp) -> Self {
        ExportPoint {
            symbol,
            avg_rate_change: metrics.window_average_rate_change,
            current_rate_change: metrics.current_rate_change,
            hourly_avg_change: metrics.bucket_rate_change.clone(),
            timestamp,
        }
    }

    /// Fields with data, in export order. "No data" values are omitted.
    pub fn fields(&self) -> Vec<(String, f64)> {
        let mut fields = Vec::with_capacity(2 + self.hourly_avg_change.len());
        if let Some(v) = self.avg_rate_change {
            fields.push(("avg_rate_change".to_string(), v));
        }
        if let Some(v) = self.current_rate_change {
            fields.push(("current_rate_change".to_string(), v));
        }
        for (i, bucket) in self.hourly_avg_change.iter().enumerate() {
            if let Some(v) = bucket {
                fields.push((format!("hourly_avg_change_{}", i + 1), *v));
            }
        }
        fields
    }

    /// InfluxDB line protocol, nanosecond precision. `None` when every field
    /// is empty, since a point needs at least one field.
    pub fn to_line_protocol(&self) -> Option<String> {
        let fields = self.fields();
        if fields.is_empty() {
            return None;
        }
        let rendered: Vec<_> = fields
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        Some(format!(
            "{},symbol={} {} {}",
            MEASUREMENT,
            self.symbol,
            rendered.join(","),
            self.timestamp.as_nanos()
        ))
    }

    pub fn restore_point(&self) -> RestorePoint {
        RestorePoint {
            symbol: self.symbol.clone(),
            current_rate_change: self.current_rate_change,
            window_average_rate_change: self.avg_rate_change,
        }
    }
}
