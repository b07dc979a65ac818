pub mod display;
pub mod feed;
pub mod loader;
pub mod persistence;
pub mod symbols;
pub mod window;

pub use display::DisplayConfig;
pub use feed::{FeedConfig, ReconnectSettings};
pub use loader::AppConfig;
pub use persistence::{LoggingConfig, PersistenceConfig};
pub use window::WindowConfig;
