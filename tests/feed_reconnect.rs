//! Feed reconnect behaviour against a scripted upstream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use trending::config::{ReconnectSettings, WindowConfig};
use trending::error::{Error, Result};
use trending::events::Tick;
use trending::price_infra::connectors::PriceConnector;
use trending::price_infra::feed::run_connection;
use trending::price_infra::{Aggregator, ReconnectPolicy};
use trending::types::{Symbol, Timestamp};

enum Step {
    ConnectFails,
    Connects,
    Tick(&'static str, f64, u64),
    Garbage,
    Drop,
    Fault,
}

/// Plays back a fixed script of connection events, then idles.
struct ScriptedConnector {
    script: VecDeque<Step>,
    connected: bool,
    connects: Arc<Mutex<u32>>,
}

impl ScriptedConnector {
    fn new(script: Vec<Step>) -> (Self, Arc<Mutex<u32>>) {
        let connects = Arc::new(Mutex::new(0));
        let connector = ScriptedConnector {
            script: script.into(),
            connected: false,
            connects: Arc::clone(&connects),
        };
        (connector, connects)
    }
}

#[async_trait]
impl PriceConnector for ScriptedConnector {
    async fn connect(&mut self) -> Result<()> {
        match self.script.pop_front() {
            Some(Step::ConnectFails) => Err(Error::ConnectionFailed("refused".to_string())),
            Some(Step::Connects) => {
                *self.connects.lock().unwrap() += 1;
                self.connected = true;
                Ok(())
            }
            _ => std::future::pending().await,
        }
    }

    async fn next_tick(&mut self) -> Result<Tick> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        match self.script.pop_front() {
            Some(Step::Tick(symbol, price, ms)) => {
                Tick::new(Symbol::new(symbol)?, price, Timestamp::from_millis(ms))
            }
            Some(Step::Garbage) => Err(Error::DecodeError("expected value at line 1".to_string())),
            Some(Step::Drop) => {
                self.connected = false;
                Err(Error::ConnectionClosed)
            }
            Some(Step::Fault) => Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "socket write failed",
            ))),
            Some(other) => {
                self.script.push_front(other);
                self.connected = false;
                Err(Error::ConnectionClosed)
            }
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.connected = false;
    }

    fn is_healthy(&self) -> bool {
        self.connected
    }

    fn source_id(&self) -> &str {
        "scripted"
    }
}

fn fast_policy() -> ReconnectPolicy {
    ReconnectPolicy::new(&ReconnectSettings::fixed(Duration::from_millis(5)))
}

async fn collect(rx: &mut mpsc::Receiver<Tick>, n: usize) -> Vec<Tick> {
    let mut ticks = Vec::with_capacity(n);
    while ticks.len() < n {
        let tick = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("tick within timeout")
            .expect("feed still open");
        ticks.push(tick);
    }
    ticks
}

#[tokio::test]
async fn reconnect_mid_stream_does_not_duplicate_or_reorder() {
    let (connector, connects) = ScriptedConnector::new(vec![
        Step::Connects,
        Step::Tick("BTCUSDT", 100.0, 1),
        Step::Tick("BTCUSDT", 101.0, 2),
        Step::Drop,
        Step::ConnectFails,
        Step::ConnectFails,
        Step::Connects,
        Step::Tick("BTCUSDT", 99.0, 5),
        Step::Garbage,
        Step::Tick("BTCUSDT", 99.0, 6),
        Step::Tick("BTCUSDT", 105.0, 7),
    ]);

    let (tx, mut rx) = mpsc::channel(64);
    let shutdown = CancellationToken::new();
    let feed = tokio::spawn(run_connection(connector, fast_policy(), tx, shutdown.clone()));

    let mut aggregator = Aggregator::new(WindowConfig::new(10, 2, 6).unwrap()).unwrap();
    for tick in collect(&mut rx, 5).await {
        aggregator.apply(&tick).unwrap();
    }

    shutdown.cancel();
    let stats = feed.await.unwrap();
    assert_eq!(stats.ticks_delivered, 5);
    assert_eq!(stats.decode_errors, 1);
    assert_eq!(stats.reconnects, 1);
    assert_eq!(stats.connect_failures, 2);
    assert_eq!(*connects.lock().unwrap(), 2);

    let btc = Symbol::new("BTCUSDT").unwrap();
    let (samples, metrics) = aggregator.reader().series(&btc).unwrap();
    assert_eq!(samples, vec![100.0, 101.0, 99.0, 99.0, 105.0]);
    assert_eq!(metrics.current_rate_change, Some(6.0));
    assert_eq!(metrics.window_average_rate_change, Some(2.25));
    assert_eq!(metrics.last_update, Some(Timestamp::from_millis(7)));
    assert_eq!(aggregator.stats().applied, 5);
}

#[tokio::test]
async fn malformed_message_keeps_connection() {
    let (connector, connects) = ScriptedConnector::new(vec![
        Step::Connects,
        Step::Garbage,
        Step::Garbage,
        Step::Tick("ETHUSDT", 1_800.0, 1),
    ]);

    let (tx, mut rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let feed = tokio::spawn(run_connection(connector, fast_policy(), tx, shutdown.clone()));

    let ticks = collect(&mut rx, 1).await;
    assert_eq!(ticks[0].price, 1_800.0);

    shutdown.cancel();
    let stats = feed.await.unwrap();
    assert_eq!(stats.decode_errors, 2);
    assert_eq!(stats.reconnects, 0);
    assert_eq!(*connects.lock().unwrap(), 1);
}

#[tokio::test]
async fn unexpected_error_still_reconnects() {
    let (connector, connects) = ScriptedConnector::new(vec![
        Step::Connects,
        Step::Tick("SOLUSDT", 20.0, 1),
        Step::Fault,
        Step::Connects,
        Step::Tick("SOLUSDT", 21.0, 2),
    ]);
    assert!(!Error::IoError(std::io::Error::other("x")).is_transient());

    let (tx, mut rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let feed = tokio::spawn(run_connection(connector, fast_policy(), tx, shutdown.clone()));

    let prices: Vec<f64> = collect(&mut rx, 2).await.iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![20.0, 21.0]);

    shutdown.cancel();
    let stats = feed.await.unwrap();
    assert_eq!(stats.reconnects, 1);
    assert_eq!(stats.decode_errors, 0);
    assert_eq!(*connects.lock().unwrap(), 2);
}

#[tokio::test]
async fn shutdown_stops_retrying() {
    let (connector, _) = ScriptedConnector::new(
        (0..1_000).map(|_| Step::ConnectFails).collect(),
    );
    let (tx, mut rx) = mpsc::channel(8);
    let shutdown = CancellationToken::new();
    let feed = tokio::spawn(run_connection(connector, fast_policy(), tx, shutdown.clone()));

    tokio::time::sleep(Duration::from_millis(30)).await;
    shutdown.cancel();

    let stats = tokio::time::timeout(Duration::from_secs(1), feed)
        .await
        .expect("feed stops promptly")
        .unwrap();
    assert!(stats.connect_failures >= 1);
    assert_eq!(stats.ticks_delivered, 0);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn dropped_receiver_ends_connection() {
    let (connector, _) = ScriptedConnector::new(vec![
        Step::Connects,
        Step::Tick("BTCUSDT", 1.0, 1),
        Step::Tick("BTCUSDT", 2.0, 2),
    ]);
    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let stats = tokio::time::timeout(
        Duration::from_secs(1),
        run_connection(connector, fast_policy(), tx, CancellationToken::new()),
    )
    .await
    .expect("connection ends without a receiver");
    assert_eq!(stats.ticks_delivered, 0);
}
