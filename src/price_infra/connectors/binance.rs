use async_trait::async_trait;
use tokio_tungstenite::{connect_async, tungstenite::Message, WebSocketStream};
use tokio_tungstenite::MaybeTlsStream;
use tokio::net::TcpStream;
use futures_util::StreamExt;
use serde::Deserialize;
use crate::events::tick::{parse_price, Tick};
use crate::price_infra::connectors::PriceConnector;
use crate::error::{Error, Result};
use crate::types::{Symbol, Timestamp};

/// Binance combined-stream connector (`<symbol>@markPrice` by default).
pub struct BinanceConnector {
    source_id: String,
    ws_url: String,
    stream_count: usize,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl BinanceConnector {
    pub fn new(base_url: &str, stream: &str, symbols: &[Symbol]) -> Self {
        let mut names: Vec<_> = symbols.iter().map(Symbol::stream_name).collect();
        names.sort();
        names.dedup();

        BinanceConnector {
            source_id: "binance".to_string(),
            ws_url: subscription_url(base_url, stream, &names),
            stream_count: names.len(),
            stream: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.ws_url
    }

    pub fn stream_count(&self) -> usize {
        self.stream_count
    }
}

/// `wss://host/stream?streams=btcusdt@markPrice/ethusdt@markPrice`
fn subscription_url(base_url: &str, stream: &str, names: &[String]) -> String {
    let streams: Vec<_> = names.iter().map(|name| format!("{}@{}", name, stream)).collect();
    format!("{}?streams={}", base_url.trim_end_matches('/'), streams.join("/"))
}

#[async_trait]
impl PriceConnector for BinanceConnector {
    async fn connect(&mut self) -> Result<()> {
        let (ws_stream, _) = connect_async(self.ws_url.as_str())
            .await
            .map_err(|e| Error::ConnectionFailed(e.to_string()))?;
        self.stream = Some(ws_stream);
        tracing::info!("Connected to Binance: {} streams", self.stream_count);
        Ok(())
    }

    async fn next_tick(&mut self) -> Result<Tick> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return decode_message(&text),
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!("Binance closed the stream: {:?}", frame);
                    self.stream = None;
                    return Err(Error::ConnectionClosed);
                }
                // Pings are answered by tungstenite on the next read.
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.stream = None;
                    return Err(Error::ConnectionFailed(e.to_string()));
                }
                None => {
                    self.stream = None;
                    return Err(Error::ConnectionClosed);
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                tracing::debug!("Error while closing Binance stream: {}", e);
            }
        }
    }

    fn is_healthy(&self) -> bool {
        self.stream.is_some()
    }

    fn source_id(&self) -> &str {
        &self.source_id
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Inbound {
    Combined { data: MarkPriceData },
    Raw(MarkPriceData),
}

#[derive(Deserialize)]
struct MarkPriceData {
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "p")]
    price: String,
    #[serde(rename = "E")]
    event_time: u64,
}

/// Decode one text frame into a tick. Fields other than symbol, price and
/// event time are ignored.
pub fn decode_message(text: &str) -> Result<Tick> {
    let inbound: Inbound = serde_json::from_str(text)
        .map_err(|e| Error::DecodeError(e.to_string()))?;
    let data = match inbound {
        Inbound::Combined { data } => data,
        Inbound::Raw(data) => data,
    };

    let symbol = Symbol::new(&data.symbol)?;
    let price = parse_price(&data.price)?;
    Tick::new(symbol, price, Timestamp::from_millis(data.event_time))
}
