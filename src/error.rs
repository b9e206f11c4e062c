//! Error types for coingrid.

use thiserror::Error;

/// The main error type for coingrid.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (portfolio file, log directory, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// Exchange responded, but not with a usable price
    #[error("Exchange error: {0}")]
    Api(String),

    /// Invalid user input (amounts, symbols, row indices)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not allowed in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),

    /// Persisted portfolio could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new exchange error.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new invalid state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Create a new channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a new storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Check if this error is recoverable (the next poll may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Api(_) | Self::Channel(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // Drop the query string so symbols and keys don't end up in logs verbatim.
        let msg = e.to_string();
        match msg.find('?') {
            Some(idx) => Self::Network(format!("{}?<query redacted>", &msg[..idx])),
            None => Self::Network(msg),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
