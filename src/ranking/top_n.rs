use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use crate::types::Symbol;
use crate::window::SeriesMetrics;

/// Metric used to rank symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSelector {
    CurrentRateChange,
    WindowAverageRateChange,
    Bucket(usize),
}

impl MetricSelector {
    pub fn select(&self, metrics: &SeriesMetrics) -> Option<f64> {
        match self {
            MetricSelector::CurrentRateChange => metrics.current_rate_change,
            MetricSelector::WindowAverageRateChange => metrics.window_average_rate_change,
            MetricSelector::Bucket(index) => metrics.bucket(*index),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedSymbol {
    pub symbol: Symbol,
    pub metrics: SeriesMetrics,
}

/// Rank entries by `selector`, highest first.
///
/// Entries without data for the selected metric sort after every entry that
/// has data. Equal values order by ascending symbol.
pub fn rank(
    entries: Vec<(Symbol, SeriesMetrics)>,
    selector: MetricSelector,
    n: usize,
) -> Vec<RankedSymbol> {
    let mut keyed: Vec<_> = entries
        .into_iter()
        .map(|(symbol, metrics)| (selector.select(&metrics), symbol, metrics))
        .collect();

    keyed.sort_by(|a, b| compare_desc(a.0, b.0).then_with(|| a.1.cmp(&b.1)));

    keyed
        .into_iter()
        .take(n)
        .map(|(_, symbol, metrics)| RankedSymbol { symbol, metrics })
        .collect()
}

fn compare_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
