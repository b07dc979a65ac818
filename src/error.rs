use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Feed Errors
    #[error("WebSocket connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Price connector not connected")]
    NotConnected,

    // Decode Errors
    #[error("Message decode failed: {0}")]
    DecodeError(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    // Persistence Errors
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization failed: {0}")]
    DeserializationError(String),

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("No snapshot found")]
    NoSnapshotFound,

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Symbol set is empty")]
    EmptySymbolSet,

    #[error("Invalid window geometry: {0}")]
    InvalidWindow(String),

    // Task Errors
    #[error("Task failure: {0}")]
    TaskFailure(String),

    // IO Errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Connection-level failures that the feed recovers from by reconnecting.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailed(_) | Error::ConnectionClosed | Error::NotConnected
        )
    }

    /// Per-message failures: the message is dropped, the connection stays up.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Error::DecodeError(_) | Error::InvalidPrice(_) | Error::InvalidSymbol(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
