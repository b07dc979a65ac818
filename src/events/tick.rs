use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::types::{Symbol, Timestamp};

/// A single price observation for a symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: Symbol,
    pub price: f64,
    pub event_time: Timestamp,
}

impl Tick {
    pub fn new(symbol: Symbol, price: f64, event_time: Timestamp) -> Result<Self> {
        validate_price(price)?;
        Ok(Tick { symbol, price, event_time })
    }
}

/// Prices must be finite and strictly positive.
pub fn validate_price(price: f64) -> Result<()> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidPrice(price.to_string()))
    }
}

/// Parse a decimal-encoded price such as `"27012.50000000"`.
pub fn parse_price(raw: &str) -> Result<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::InvalidPrice(raw.to_string()))?;
    validate_price(price)?;
    Ok(price)
}
