use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::persistence::point::ExportPoint;
use crate::ranking::{MetricsSnapshot, RestorePoint};
use crate::types::Timestamp;

/// All points written by one export run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportBatch {
    pub version: u32,
    pub exported_at: Timestamp,
    pub points: Vec<ExportPoint>,
    pub checksum: String,
}

impl ExportBatch {
    pub fn new(exported_at: Timestamp, points: Vec<ExportPoint>) -> Self {
        let mut batch = ExportBatch {
            version: crate::EXPORT_FORMAT_VERSION,
            exported_at,
            points,
            checksum: String::new(),
        };

        batch.checksum = batch.calculate_checksum();
        batch
    }

    /// Every symbol in the snapshot, stamped with the export time.
    pub fn from_snapshot(snapshot: &MetricsSnapshot, exported_at: Timestamp) -> Self {
        let points = snapshot
            .entries
            .iter()
            .map(|(symbol, metrics)| ExportPoint::from_metrics(symbol.clone(), metrics, exported_at))
            .collect();
        ExportBatch::new(exported_at, points)
    }

    fn calculate_checksum(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.version.to_le_bytes());
        hasher.update(self.exported_at.as_millis().to_le_bytes());

        for point in &self.points {
            hasher.update(point.symbol.as_str().as_bytes());
            for value in [point.avg_rate_change, point.current_rate_change]
                .iter()
                .chain(point.hourly_avg_change.iter())
            {
                match value {
                    Some(v) => hasher.update(v.to_bits().to_le_bytes()),
                    None => hasher.update([0xff]),
                }
            }
        }

        hex::encode(hasher.finalize())
    }

    pub fn verify_checksum(&self) -> bool {
        self.calculate_checksum() == self.checksum
    }

    pub fn restore_points(&self) -> Vec<RestorePoint> {
        self.points.iter().map(ExportPoint::restore_point).collect()
    }

    /// Line-protocol body for the whole batch, skipping empty points.
    pub fn to_line_protocol(&self) -> String {
        self.points
            .iter()
            .filter_map(ExportPoint::to_line_protocol)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Symbol;
    use crate::window::SeriesMetrics;

    fn snapshot() -> MetricsSnapshot {
        let metrics = SeriesMetrics {
            last_price: Some(105.0),
            last_update: Some(Timestamp::from_millis(5)),
            sample_count: 5,
            current_rate_change: Some(6.0),
            window_average_rate_change: Some(2.25),
            bucket_rate_change: vec![Some(6.0), Some(2.0), None],
        };
        MetricsSnapshot {
            taken_at: Timestamp::from_millis(10),
            entries: vec![(Symbol::new("BTCUSDT").unwrap(), metrics)],
        }
    }

    #[test]
    fn checksum_detects_tampering() {
        let mut batch = ExportBatch::from_snapshot(&snapshot(), Timestamp::from_millis(20));
        assert!(batch.verify_checksum());

        batch.points[0].current_rate_change = Some(7.0);
        assert!(!batch.verify_checksum());
    }

    #[test]
    fn restore_points_carry_headline_metrics_only() {
        let batch = ExportBatch::from_snapshot(&snapshot(), Timestamp::from_millis(20));
        let restored = batch.restore_points();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].current_rate_change, Some(6.0));
        assert_eq!(restored[0].window_average_rate_change, Some(2.25));
        assert_eq!(batch.points[0].timestamp, Timestamp::from_millis(20));
    }
}
