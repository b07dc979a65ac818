use std::collections::VecDeque;
use crate::config::WindowConfig;
use crate::types::Timestamp;
use crate::utils::helper::mean_abs_change;
use crate::window::metrics::SeriesMetrics;

/// Bounded price history for one symbol plus its derived metrics.
///
/// ## Window
/// - `samples` holds at most `window_size` prices, oldest first.
/// - New prices are appended at the tail; overflow evicts from the head.
///
/// ## Running sum
/// `diff_sum` tracks the sum of absolute differences between adjacent
/// retained samples, so the window average costs O(1) per tick. It is
/// rebuilt from the samples once every `window_size` evictions, and
/// whenever an evicted difference outweighs the remaining sum, so a window
/// that went flat reports exactly zero.
///
/// ## Buckets
/// Bucket `i` covers sample indices `[len - (i+1)*P, len - i*P)`, clipped
/// at zero. A bucket holding fewer than two samples reports `None`.
#[derive(Clone, Debug)]
pub struct SymbolSeries {
    geometry: WindowConfig,
    samples: VecDeque<f64>,
    last_price: Option<f64>,
    last_update: Option<Timestamp>,
    current_rate_change: Option<f64>,
    window_average_rate_change: Option<f64>,
    bucket_rate_change: Vec<Option<f64>>,
    diff_sum: f64,
    evictions_since_anchor: usize,
}

impl SymbolSeries {
    pub fn new(geometry: &WindowConfig) -> Self {
        SymbolSeries {
            geometry: geometry.clone(),
            samples: VecDeque::with_capacity(geometry.window_size + 1),
            last_price: None,
            last_update: None,
            current_rate_change: None,
            window_average_rate_change: None,
            bucket_rate_change: vec![None; geometry.bucket_count],
            diff_sum: 0.0,
            evictions_since_anchor: 0,
        }
    }

    /// A series pre-seeded from persisted metrics; no sample history.
    pub fn seeded(
        geometry: &WindowConfig,
        current_rate_change: Option<f64>,
        window_average_rate_change: Option<f64>,
    ) -> Self {
        let mut series = SymbolSeries::new(geometry);
        series.current_rate_change = current_rate_change;
        series.window_average_rate_change = window_average_rate_change;
        series
    }

    /// Apply one price. The caller is responsible for rejecting invalid prices.
    pub fn apply(&mut self, price: f64, time: Timestamp) {
        self.current_rate_change = self.last_price.map(|last| (price - last).abs());
        self.last_price = Some(price);

        if let Some(&newest) = self.samples.back() {
            self.diff_sum += (price - newest).abs();
        }
        self.samples.push_back(price);

        if self.samples.len() > self.geometry.window_size {
            self.evict_oldest();
        }

        if self.samples.len() >= 2 {
            let pairs = (self.samples.len() - 1) as f64;
            self.window_average_rate_change = Some(self.diff_sum.max(0.0) / pairs);
        }

        self.recompute_buckets();
        self.last_update = Some(time);
    }

    fn evict_oldest(&mut self) {
        let mut evicted = 0.0;
        if let Some(oldest) = self.samples.pop_front() {
            if let Some(&next) = self.samples.front() {
                evicted = (next - oldest).abs();
                self.diff_sum -= evicted;
            }
            self.evictions_since_anchor += 1;
        }

        // Removing a difference larger than what remains cancels most of the
        // sum; the leftover is rounding residue, so rebuild instead.
        if evicted > self.diff_sum || self.evictions_since_anchor >= self.geometry.window_size {
            self.diff_sum = self.full_diff_sum();
            self.evictions_since_anchor = 0;
        }
    }

    fn full_diff_sum(&self) -> f64 {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .map(|(a, b)| (b - a).abs())
            .sum()
    }

    fn recompute_buckets(&mut self) {
        let len = self.samples.len();
        let block = self.geometry.bucket_size;

        for (i, bucket) in self.bucket_rate_change.iter_mut().enumerate() {
            *bucket = match len.checked_sub(i * block) {
                Some(end) => {
                    let start = end.saturating_sub(block);
                    mean_abs_change(self.samples.range(start..end))
                }
                None => None,
            };
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    pub fn last_update(&self) -> Option<Timestamp> {
        self.last_update
    }

    pub fn current_rate_change(&self) -> Option<f64> {
        self.current_rate_change
    }

    pub fn window_average_rate_change(&self) -> Option<f64> {
        self.window_average_rate_change
    }

    pub fn bucket_rate_change(&self) -> &[Option<f64>] {
        &self.bucket_rate_change
    }

    pub fn metrics(&self) -> SeriesMetrics {
        SeriesMetrics {
            last_price: self.last_price,
            last_update: self.last_update,
            sample_count: self.samples.len(),
            current_rate_change: self.current_rate_change,
            window_average_rate_change: self.window_average_rate_change,
            bucket_rate_change: self.bucket_rate_change.clone(),
        }
    }
}
