pub mod metrics;
pub mod series;
pub mod store;

pub use metrics::SeriesMetrics;
pub use series::SymbolSeries;
pub use store::{RollingWindowStore, StoreReader};
