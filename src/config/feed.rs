use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Combined-stream endpoint; stream names are appended as `?streams=`.
    pub url: String,
    /// Stream suffix appended to every symbol, e.g. `markPrice`.
    pub stream: String,
    pub symbols: Vec<String>,
    /// Newline-separated symbol list.
    pub symbols_file: Option<PathBuf>,
    /// Saved `exchangeInfo` document to derive the universe from.
    pub exchange_info_file: Option<PathBuf>,
    pub quote_asset: String,
    pub max_streams_per_connection: usize,
    pub channel_capacity: usize,
    pub reconnect: ReconnectSettings,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            url: "wss://fstream.binance.com/stream".to_string(),
            stream: "markPrice".to_string(),
            symbols: Vec::new(),
            symbols_file: None,
            exchange_info_file: None,
            quote_asset: "USDT".to_string(),
            max_streams_per_connection: 200,
            channel_capacity: 10_000,
            reconnect: ReconnectSettings::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconnectSettings {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        ReconnectSettings {
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
            multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl ReconnectSettings {
    /// Constant delay with no growth and no jitter.
    pub fn fixed(delay: Duration) -> Self {
        let millis = delay.as_millis() as u64;
        ReconnectSettings {
            initial_delay_ms: millis,
            max_delay_ms: millis,
            multiplier: 1.0,
            jitter_factor: 0.0,
        }
    }
}
