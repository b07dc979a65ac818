pub mod display_sink;
pub mod metrics_sink;

pub use display_sink::{DisplaySink, StdoutSink};
pub use metrics_sink::MetricsSink;
