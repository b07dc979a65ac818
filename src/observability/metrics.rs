use std::sync::Once;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Ingestion metrics
    pub static ref TICKS_APPLIED: IntCounter = IntCounter::new(
        "ticks_applied_total",
        "Ticks applied to the rolling window store"
    ).expect("valid metric definition");

    pub static ref TICKS_REJECTED: IntCounter = IntCounter::new(
        "ticks_rejected_total",
        "Ticks rejected before reaching the store"
    ).expect("valid metric definition");

    pub static ref SYMBOLS_TRACKED: IntGauge = IntGauge::new(
        "symbols_tracked",
        "Symbols with state in the rolling window store"
    ).expect("valid metric definition");

    // Feed metrics
    pub static ref DECODE_ERRORS: IntCounter = IntCounter::new(
        "feed_decode_errors_total",
        "Upstream messages dropped because they could not be decoded"
    ).expect("valid metric definition");

    pub static ref FEED_RECONNECTS: IntCounter = IntCounter::new(
        "feed_reconnects_total",
        "Upstream connections lost and re-established"
    ).expect("valid metric definition");

    // Persistence metrics
    pub static ref EXPORTS_WRITTEN: IntCounter = IntCounter::new(
        "exports_written_total",
        "Export batches written"
    ).expect("valid metric definition");

    pub static ref EXPORTS_FAILED: IntCounter = IntCounter::new(
        "exports_failed_total",
        "Export batches dropped after a write failure"
    ).expect("valid metric definition");
}

static REGISTER: Once = Once::new();

pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(TICKS_APPLIED.clone()),
            Box::new(TICKS_REJECTED.clone()),
            Box::new(SYMBOLS_TRACKED.clone()),
            Box::new(DECODE_ERRORS.clone()),
            Box::new(FEED_RECONNECTS.clone()),
            Box::new(EXPORTS_WRITTEN.clone()),
            Box::new(EXPORTS_FAILED.clone()),
        ];
        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                tracing::error!("Failed to register metric: {}", e);
            }
        }
    });
}

/// Prometheus text exposition of the registry.
pub fn gather_text() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_metrics_appear_in_exposition() {
        register_metrics();
        register_metrics();
        FEED_RECONNECTS.inc();

        let text = gather_text();
        assert!(text.contains("feed_reconnects_total"));
        assert!(text.contains("ticks_applied_total"));
    }
}
