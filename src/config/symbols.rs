use std::collections::BTreeSet;
use std::path::Path;
use serde::Deserialize;
use crate::config::feed::FeedConfig;
use crate::error::{Error, Result};
use crate::types::Symbol;

#[derive(Deserialize)]
struct ExchangeInfo {
    symbols: Vec<ExchangeSymbol>,
}

#[derive(Deserialize)]
struct ExchangeSymbol {
    symbol: String,
    #[serde(default)]
    status: Option<String>,
}

/// Resolve the subscribed universe from every configured source.
///
/// The result is de-duplicated and sorted so that the same configuration
/// always yields the same subscription.
pub fn resolve_symbols(config: &FeedConfig) -> Result<Vec<Symbol>> {
    let mut resolved = BTreeSet::new();

    for raw in &config.symbols {
        resolved.insert(Symbol::new(raw)?);
    }

    if let Some(path) = &config.symbols_file {
        resolved.extend(read_symbols_file(path)?);
    }

    if let Some(path) = &config.exchange_info_file {
        let body = std::fs::read_to_string(path)?;
        resolved.extend(symbols_from_exchange_info(&body, &config.quote_asset)?);
    }

    if resolved.is_empty() {
        return Err(Error::EmptySymbolSet);
    }

    tracing::info!("Resolved {} symbols", resolved.len());
    Ok(resolved.into_iter().collect())
}

/// One symbol per line; blank lines and `#` comments are ignored.
pub fn read_symbols_file(path: &Path) -> Result<Vec<Symbol>> {
    let contents = std::fs::read_to_string(path)?;
    parse_symbol_lines(&contents)
}

pub fn parse_symbol_lines(contents: &str) -> Result<Vec<Symbol>> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Symbol::new)
        .collect()
}

/// Extract trading symbols quoted in `quote_asset` from an `exchangeInfo` body.
pub fn symbols_from_exchange_info(body: &str, quote_asset: &str) -> Result<Vec<Symbol>> {
    let info: ExchangeInfo = serde_json::from_str(body)
        .map_err(|e| Error::ConfigError(format!("invalid exchangeInfo document: {}", e)))?;
    let suffix = quote_asset.to_ascii_uppercase();

    let mut symbols = Vec::new();
    for entry in info.symbols {
        let tradable = entry.status.as_deref().map_or(true, |s| s == "TRADING");
        if !tradable || !entry.symbol.to_ascii_uppercase().ends_with(&suffix) {
            continue;
        }
        match Symbol::new(&entry.symbol) {
            Ok(symbol) => symbols.push(symbol),
            Err(_) => tracing::warn!("Skipping unusable symbol in exchangeInfo: {:?}", entry.symbol),
        }
    }

    Ok(symbols)
}
