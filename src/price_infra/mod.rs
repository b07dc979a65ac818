pub mod aggregator;
pub mod connectors;
pub mod feed;
pub mod reconnect;

pub use aggregator::{Aggregator, AggregatorStats};
pub use feed::{FeedConnector, FeedStats};
pub use reconnect::ReconnectPolicy;
