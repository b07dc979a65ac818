use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Assumed upstream cadence: one sample every 3 seconds.
pub const ASSUMED_TICK_INTERVAL_SECS: usize = 3;

/// Window geometry expressed in sample counts.
///
/// `window_size` and `bucket_size` stand in for 12 hours and 1 hour only
/// while the feed delivers one tick per `ASSUMED_TICK_INTERVAL_SECS`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    pub window_size: usize,
    pub bucket_size: usize,
    pub bucket_count: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            window_size: 12 * 60 * 60 / ASSUMED_TICK_INTERVAL_SECS,  // 12 hours
            bucket_size: 60 * 60 / ASSUMED_TICK_INTERVAL_SECS,       // 1 hour
            bucket_count: 6,
        }
    }
}

impl WindowConfig {
    pub fn new(window_size: usize, bucket_size: usize, bucket_count: usize) -> Result<Self> {
        let config = WindowConfig { window_size, bucket_size, bucket_count };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(Error::InvalidWindow(format!(
                "window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        if self.bucket_size < 2 {
            return Err(Error::InvalidWindow(format!(
                "bucket_size must be at least 2, got {}",
                self.bucket_size
            )));
        }
        if self.bucket_count == 0 {
            return Err(Error::InvalidWindow("bucket_count must be positive".to_string()));
        }
        Ok(())
    }
}
