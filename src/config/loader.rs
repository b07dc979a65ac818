use crate::config::display::DisplayConfig;
use crate::config::feed::FeedConfig;
use crate::config::persistence::{LoggingConfig, PersistenceConfig};
use crate::config::window::WindowConfig;
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub window: WindowConfig,
    pub display: DisplayConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Layered load: `config/default`, `config/<env>`, then `TRENDING__*` variables.
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("TRENDING")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("feed.symbols")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    /// Parse a TOML document directly; used by tests and embedders.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(contents, config::FileFormat::Toml))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;

        if self.feed.max_streams_per_connection == 0 {
            return Err(Error::ConfigError(
                "feed.max_streams_per_connection must be positive".to_string(),
            ));
        }
        if self.feed.channel_capacity == 0 {
            return Err(Error::ConfigError("feed.channel_capacity must be positive".to_string()));
        }
        if self.display.enabled && self.display.interval_ms == 0 {
            return Err(Error::ConfigError("display.interval_ms must be positive".to_string()));
        }
        if self.persistence.enabled && self.persistence.interval_secs == 0 {
            return Err(Error::ConfigError(
                "persistence.interval_secs must be positive".to_string(),
            ));
        }
        if let crate::ranking::MetricSelector::Bucket(index) = self.display.rank_by {
            if index >= self.window.bucket_count {
                return Err(Error::ConfigError(format!(
                    "display.rank_by bucket {} out of range (bucket_count = {})",
                    index, self.window.bucket_count
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::MetricSelector;

    #[test]
    fn defaults_fill_missing_sections() {
        let app = AppConfig::from_toml(
            r#"
            [feed]
            symbols = ["BTCUSDT"]

            [window]
            window_size = 10
            bucket_size = 2
            "#,
        )
        .unwrap();

        assert_eq!(app.feed.symbols, vec!["BTCUSDT".to_string()]);
        assert_eq!(app.window.window_size, 10);
        assert_eq!(app.window.bucket_count, 6);
        assert_eq!(app.display.top_n, 60);
        assert_eq!(app.persistence.interval_secs, 900);
    }

    #[test]
    fn shipped_default_config_is_valid() {
        let app = AppConfig::from_toml(include_str!("../../config/default.toml")).unwrap();
        assert_eq!(app.window.window_size, 14_400);
        assert_eq!(app.window.bucket_size, 1_200);
        assert_eq!(app.feed.reconnect.initial_delay_ms, 1_000);
        assert!(app.feed.symbols.contains(&"BTCUSDT".to_string()));
    }

    #[test]
    fn parses_rank_by_selector() {
        let app = AppConfig::from_toml(
            r#"
            [display]
            rank_by = "window_average_rate_change"
            "#,
        )
        .unwrap();
        assert_eq!(app.display.rank_by, MetricSelector::WindowAverageRateChange);
    }

    #[test]
    fn rejects_invalid_window() {
        let result = AppConfig::from_toml(
            r#"
            [window]
            window_size = 1
            "#,
        );
        assert!(matches!(result, Err(Error::InvalidWindow(_))));
    }
}
