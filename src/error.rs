//! Error types for the tutor gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the tutor gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing client input
    #[error("{0}")]
    Validation(String),

    /// Request body could not be parsed
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Configuration error (e.g. missing upstream credential)
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream completion API failure
    #[error("upstream error: {0}")]
    Upstream(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether the error was caused by the caller rather than the gateway
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MalformedRequest(_))
    }
}
