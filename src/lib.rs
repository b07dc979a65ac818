pub mod config;
pub mod error;
pub mod events;
pub mod interfaces;
pub mod observability;
pub mod persistence;
pub mod price_infra;
pub mod ranking;
pub mod scheduler;
pub mod types;
pub mod utils;
pub mod window;

// Export batch format version
pub const EXPORT_FORMAT_VERSION: u32 = 1;

// Grace period for background tasks on shutdown
pub const SHUTDOWN_GRACE_SECS: u64 = 10;
