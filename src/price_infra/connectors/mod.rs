pub mod binance;

use async_trait::async_trait;
use crate::events::Tick;
use crate::error::Result;

/// One upstream streaming connection.
///
/// `next_tick` distinguishes per-message failures (`Error::is_decode`),
/// after which the connection is still usable, from every other error,
/// after which the caller must `close` and `connect` again. Expected
/// connection loss is reported as `Error::is_transient`.
#[async_trait]
pub trait PriceConnector: Send {
    async fn connect(&mut self) -> Result<()>;
    async fn next_tick(&mut self) -> Result<Tick>;
    async fn close(&mut self);
    fn is_healthy(&self) -> bool;
    fn source_id(&self) -> &str;
}
