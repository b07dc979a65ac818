use std::time::Duration;
use async_trait::async_trait;
use crate::error::Result;
use crate::interfaces::DisplaySink;
use crate::ranking::{MetricSelector, RankedSymbol, SnapshotProvider};
use crate::scheduler::PeriodicTask;
use crate::utils::helper::format_metric;

/// Ranked table of the most active symbols.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    pub fn from_ranked(ranked: &[RankedSymbol], bucket_count: usize) -> Self {
        let mut header = vec![
            "Symbol".to_string(),
            "AvgRateChange".to_string(),
            "CurrentRateChange".to_string(),
        ];
        header.extend((1..=bucket_count).map(|hour| format!("{}h", hour)));

        let rows = ranked
            .iter()
            .map(|entry| {
                let mut row = vec![
                    entry.symbol.to_string(),
                    format_metric(entry.metrics.window_average_rate_change),
                    format_metric(entry.metrics.current_rate_change),
                ];
                row.extend((0..bucket_count).map(|i| format_metric(entry.metrics.bucket(i))));
                row
            })
            .collect();

        DisplayTable { header, rows }
    }

    /// Left-aligned columns padded to the widest cell.
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(String::len).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let render = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(render(&self.header));
        lines.extend(self.rows.iter().map(|row| render(row)));
        lines.join("\n")
    }
}

/// Periodically redraws the top-N table.
pub struct DisplayTask {
    provider: SnapshotProvider,
    sink: Box<dyn DisplaySink>,
    selector: MetricSelector,
    top_n: usize,
    period: Duration,
}

impl DisplayTask {
    pub fn new(
        provider: SnapshotProvider,
        sink: Box<dyn DisplaySink>,
        selector: MetricSelector,
        top_n: usize,
        period: Duration,
    ) -> Self {
        DisplayTask { provider, sink, selector, top_n, period }
    }

    pub fn build_table(&self) -> DisplayTable {
        let ranked = self.provider.top_n(self.selector, self.top_n);
        DisplayTable::from_ranked(&ranked, self.provider.bucket_count())
    }
}

#[async_trait]
impl PeriodicTask for DisplayTask {
    fn name(&self) -> &str {
        "display"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn run_immediately(&self) -> bool {
        true
    }

    async fn run_once(&mut self) -> Result<()> {
        let table = self.build_table();
        self.sink.render(&table)
    }
}
