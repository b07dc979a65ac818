use std::sync::Arc;
use dashmap::DashMap;
use crate::config::WindowConfig;
use crate::error::Result;
use crate::events::tick::validate_price;
use crate::types::{Symbol, Timestamp};
use crate::window::metrics::SeriesMetrics;
use crate::window::series::SymbolSeries;

/// Per-symbol rolling windows.
///
/// Every series sits behind its shard's lock in a `DashMap`, so one
/// `update` is applied atomically with respect to readers of that symbol
/// and never blocks readers of symbols in other shards.
///
/// The store itself is the write handle and is not `Clone`; read access is
/// handed out as [`StoreReader`].
pub struct RollingWindowStore {
    series: Arc<DashMap<Symbol, SymbolSeries>>,
    geometry: WindowConfig,
}

impl RollingWindowStore {
    pub fn new(geometry: WindowConfig) -> Result<Self> {
        geometry.validate()?;
        Ok(RollingWindowStore {
            series: Arc::new(DashMap::new()),
            geometry,
        })
    }

    /// Apply one price to `symbol`, creating its series on first sight.
    pub fn update(&self, symbol: &Symbol, price: f64, time: Timestamp) -> Result<()> {
        validate_price(price)?;

        if let Some(mut series) = self.series.get_mut(symbol) {
            series.apply(price, time);
            return Ok(());
        }

        self.series
            .entry(symbol.clone())
            .or_insert_with(|| SymbolSeries::new(&self.geometry))
            .apply(price, time);
        Ok(())
    }

    /// Replace a symbol's state with persisted metrics. Returns false when
    /// live data already exists for the symbol, which is left untouched.
    pub fn seed(
        &self,
        symbol: &Symbol,
        current_rate_change: Option<f64>,
        window_average_rate_change: Option<f64>,
    ) -> bool {
        if let Some(existing) = self.series.get(symbol) {
            if !existing.is_empty() {
                return false;
            }
        }

        self.series.insert(
            symbol.clone(),
            SymbolSeries::seeded(&self.geometry, current_rate_change, window_average_rate_change),
        );
        true
    }

    pub fn reader(&self) -> StoreReader {
        StoreReader {
            series: Arc::clone(&self.series),
            bucket_count: self.geometry.bucket_count,
        }
    }
}

/// Read-only view over a [`RollingWindowStore`].
///
/// Each accessor copies data out under the symbol's read lock; no lock is
/// held once the call returns.
#[derive(Clone)]
pub struct StoreReader {
    series: Arc<DashMap<Symbol, SymbolSeries>>,
    bucket_count: usize,
}

impl StoreReader {
    pub fn metrics(&self, symbol: &Symbol) -> Option<SeriesMetrics> {
        self.series.get(symbol).map(|series| series.metrics())
    }

    pub fn samples(&self, symbol: &Symbol) -> Option<Vec<f64>> {
        self.series.get(symbol).map(|series| series.samples().collect())
    }

    /// Samples and metrics copied under the same lock, so the pair always
    /// reflects one complete update.
    pub fn series(&self, symbol: &Symbol) -> Option<(Vec<f64>, SeriesMetrics)> {
        self.series
            .get(symbol)
            .map(|series| (series.samples().collect(), series.metrics()))
    }

    /// Copy every symbol's metrics, sorted by symbol.
    pub fn all_metrics(&self) -> Vec<(Symbol, SeriesMetrics)> {
        let mut entries: Vec<_> = self
            .series
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().metrics()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn symbol(name: &str) -> Symbol {
        Symbol::new(name).unwrap()
    }

    fn store() -> RollingWindowStore {
        RollingWindowStore::new(WindowConfig::new(10, 2, 6).unwrap()).unwrap()
    }

    #[test]
    fn creates_series_lazily() {
        let store = store();
        let reader = store.reader();
        assert!(reader.is_empty());

        store.update(&symbol("BTCUSDT"), 100.0, Timestamp::from_millis(1)).unwrap();
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.samples(&symbol("BTCUSDT")), Some(vec![100.0]));
        assert_eq!(reader.metrics(&symbol("ETHUSDT")), None);
    }

    #[test]
    fn rejects_invalid_price_without_touching_state() {
        let store = store();
        let btc = symbol("BTCUSDT");
        store.update(&btc, 100.0, Timestamp::from_millis(1)).unwrap();

        let result = store.update(&btc, -3.0, Timestamp::from_millis(2));
        assert!(matches!(result, Err(Error::InvalidPrice(_))));
        assert_eq!(store.reader().samples(&btc), Some(vec![100.0]));

        assert!(store.update(&symbol("ETHUSDT"), f64::NAN, Timestamp::from_millis(3)).is_err());
        assert_eq!(store.reader().len(), 1);
    }

    #[test]
    fn seed_does_not_overwrite_live_history() {
        let store = store();
        let btc = symbol("BTCUSDT");
        store.update(&btc, 100.0, Timestamp::from_millis(1)).unwrap();

        assert!(!store.seed(&btc, Some(9.0), Some(9.0)));
        assert!(store.seed(&symbol("ETHUSDT"), Some(1.0), Some(0.5)));

        let eth = store.reader().metrics(&symbol("ETHUSDT")).unwrap();
        assert_eq!(eth.current_rate_change, Some(1.0));
        assert_eq!(eth.window_average_rate_change, Some(0.5));
        assert_eq!(eth.sample_count, 0);
        assert!(eth.bucket_rate_change.iter().all(Option::is_none));
    }

    #[test]
    fn all_metrics_is_sorted_by_symbol() {
        let store = store();
        for name in ["XRPUSDT", "ADAUSDT", "BTCUSDT"] {
            store.update(&symbol(name), 1.0, Timestamp::from_millis(1)).unwrap();
        }
        let names: Vec<_> = store
            .reader()
            .all_metrics()
            .into_iter()
            .map(|(s, _)| s.to_string())
            .collect();
        assert_eq!(names, vec!["ADAUSDT", "BTCUSDT", "XRPUSDT"]);
    }
}
