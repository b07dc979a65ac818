//! Export, restore and read-path consistency across components.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use trending::config::WindowConfig;
use trending::error::Error;
use trending::events::Tick;
use trending::interfaces::MetricsSink;
use trending::persistence::SnapshotStore;
use trending::price_infra::Aggregator;
use trending::ranking::MetricSelector;
use trending::scheduler::{ExportTask, PeriodicTask};
use trending::types::{Symbol, Timestamp};
use trending::window::RollingWindowStore;

fn geometry() -> WindowConfig {
    WindowConfig::new(10, 2, 6).unwrap()
}

fn symbol(name: &str) -> Symbol {
    Symbol::new(name).unwrap()
}

fn feed(aggregator: &mut Aggregator, name: &str, prices: &[f64]) {
    for (i, price) in prices.iter().enumerate() {
        let tick = Tick::new(symbol(name), *price, Timestamp::from_millis(i as u64 * 3_000)).unwrap();
        aggregator.apply(&tick).unwrap();
    }
}

#[tokio::test]
async fn exported_metrics_seed_a_fresh_process() {
    let dir = tempfile::tempdir().unwrap();
    let sink: Arc<dyn MetricsSink> = Arc::new(SnapshotStore::new(dir.path(), 4));

    let mut first = Aggregator::new(geometry()).unwrap();
    feed(&mut first, "BTCUSDT", &[100.0, 101.0, 99.0, 99.0, 105.0]);
    feed(&mut first, "ETHUSDT", &[1_800.0]);

    let mut export = ExportTask::new(first.provider(), Arc::clone(&sink), Duration::from_secs(900));
    export.run_once().await.unwrap();

    let points = sink.load_latest().await.unwrap();
    assert_eq!(points.len(), 2);

    let btc = symbol("BTCUSDT");
    let eth = symbol("ETHUSDT");
    let mut second = Aggregator::new(geometry())
        .unwrap()
        .with_universe(vec![btc.clone(), eth.clone()]);
    assert_eq!(second.restore(&points), 2);

    let reader = second.reader();
    let seeded = reader.metrics(&btc).unwrap();
    assert_eq!(seeded.current_rate_change, Some(6.0));
    assert_eq!(seeded.window_average_rate_change, Some(2.25));
    assert_eq!(seeded.sample_count, 0);

    let eth_seeded = reader.metrics(&eth).unwrap();
    assert_eq!(eth_seeded.current_rate_change, None);
    assert_eq!(eth_seeded.window_average_rate_change, None);

    // First live tick: no previous price, restored average survives.
    feed(&mut second, "BTCUSDT", &[110.0]);
    let after_one = reader.metrics(&btc).unwrap();
    assert_eq!(after_one.current_rate_change, None);
    assert_eq!(after_one.window_average_rate_change, Some(2.25));
    assert_eq!(after_one.last_price, Some(110.0));

    // Second live tick: metrics come from live samples only.
    let tick = Tick::new(btc.clone(), 112.0, Timestamp::from_millis(99_000)).unwrap();
    second.apply(&tick).unwrap();
    let after_two = reader.metrics(&btc).unwrap();
    assert_eq!(after_two.current_rate_change, Some(2.0));
    assert_eq!(after_two.window_average_rate_change, Some(2.0));
}

#[tokio::test]
async fn empty_state_exports_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let sink: Arc<dyn MetricsSink> = Arc::new(SnapshotStore::new(dir.path(), 4));
    let aggregator = Aggregator::new(geometry()).unwrap();

    let mut export = ExportTask::new(aggregator.provider(), Arc::clone(&sink), Duration::from_secs(1));
    export.run_once().await.unwrap();

    assert!(matches!(sink.load_latest().await, Err(Error::NoSnapshotFound)));
}

#[test]
fn top_n_is_deterministic_on_ties() {
    let mut aggregator = Aggregator::new(geometry()).unwrap();
    feed(&mut aggregator, "SOLUSDT", &[10.0, 12.0]);
    feed(&mut aggregator, "ADAUSDT", &[1.0, 3.0]);
    feed(&mut aggregator, "XRPUSDT", &[5.0, 8.0]);
    feed(&mut aggregator, "DOGEUSDT", &[0.1]);
    feed(&mut aggregator, "BTCUSDT", &[50.0, 52.0]);

    let provider = aggregator.provider();
    for _ in 0..3 {
        let names: Vec<String> = provider
            .top_n(MetricSelector::CurrentRateChange, 10)
            .into_iter()
            .map(|ranked| ranked.symbol.to_string())
            .collect();
        assert_eq!(names, vec!["XRPUSDT", "ADAUSDT", "BTCUSDT", "SOLUSDT", "DOGEUSDT"]);
    }

    let top_two = provider.top_n(MetricSelector::CurrentRateChange, 2);
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[1].symbol, symbol("ADAUSDT"));
    assert!(provider.top_n(MetricSelector::CurrentRateChange, 0).is_empty());
}

#[test]
fn readers_never_observe_partial_updates() {
    let store = RollingWindowStore::new(WindowConfig::new(32, 8, 4).unwrap()).unwrap();
    let btc = symbol("BTCUSDT");

    thread::scope(|scope| {
        for _ in 0..3 {
            let reader = store.reader();
            let btc = btc.clone();
            scope.spawn(move || {
                for _ in 0..2_000 {
                    let Some((samples, metrics)) = reader.series(&btc) else {
                        continue;
                    };
                    assert_eq!(samples.len(), metrics.sample_count);
                    assert_eq!(samples.last().copied(), metrics.last_price);
                    if samples.len() >= 2 {
                        let n = samples.len();
                        let expected = (samples[n - 1] - samples[n - 2]).abs();
                        assert_eq!(metrics.current_rate_change, Some(expected));
                    }
                }
            });
        }

        for i in 0..5_000u64 {
            let price = 100.0 + ((i * 37) % 101) as f64 * 0.5;
            store.update(&btc, price, Timestamp::from_millis(i)).unwrap();
        }
    });

    assert_eq!(store.reader().samples(&btc).unwrap().len(), 32);
}
