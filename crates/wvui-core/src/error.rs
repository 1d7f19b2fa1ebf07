//! Error types for WVUI

use thiserror::Error;

/// Core error type for WVUI operations
#[derive(Error, Debug)]
pub enum WvError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl WvError {
    /// HTTP status code carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            WvError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error came from the network layer rather than local state.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WvError::Connection(_) | WvError::Http { .. } | WvError::Timeout(_) | WvError::Decode(_)
        )
    }
}

/// Result type alias for WVUI operations
pub type Result<T> = std::result::Result<T, WvError>;
