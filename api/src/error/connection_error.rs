//! Transport and encoding errors.

use thiserror::Error;

/// Errors from the connection layer.
///
/// The core never retries these; they surface to the caller unchanged.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// HTTP request failed due to network or protocol error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to establish or configure the connection.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A body or query could not be encoded in the requested format.
    #[error("Cannot encode {format} payload: {message}")]
    Encode {
        /// The format tag.
        format: String,
        /// The encoder message.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("Cannot decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ConnectionError {
    /// Creates an encoding error.
    pub fn encode(format: impl ToString, message: impl ToString) -> Self {
        Self::Encode {
            format: format.to_string(),
            message: message.to_string(),
        }
    }

    /// Returns `true` if this error happened before anything was sent.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encode { .. })
    }
}
