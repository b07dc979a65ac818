use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in milliseconds since epoch
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Mean of absolute differences between consecutive prices.
///
/// Returns `None` when fewer than two prices are given.
pub fn mean_abs_change<'a, I>(prices: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut iter = prices.into_iter();
    let mut prev = *iter.next()?;
    let mut total = 0.0;
    let mut count = 0usize;

    for &price in iter {
        total += (price - prev).abs();
        prev = price;
        count += 1;
    }

    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

/// Format an optional metric for tabular output.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.5}", v),
        None => "N/A".to_string(),
    }
}

/// Relative-or-absolute float comparison used to check running sums.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    let diff = (a - b).abs();
    diff <= tolerance || diff <= tolerance * a.abs().max(b.abs())
}
