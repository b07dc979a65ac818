use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Install the global subscriber. `RUST_LOG` overrides the configured filter.
///
/// Logs go to stderr; stdout belongs to the ranking table.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| Error::ConfigError(format!("invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| Error::ConfigError(format!("tracing already initialised: {}", e)))
}

pub fn feed_connection_span(connection: usize, streams: usize) -> Span {
    tracing::info_span!(
        "feed_connection",
        connection = connection,
        streams = streams,
    )
}

pub fn export_span(symbols: usize) -> Span {
    tracing::info_span!(
        "export",
        symbols = symbols,
    )
}
