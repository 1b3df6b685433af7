//! Client error types

use thiserror::Error;

/// Client-side error
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, or another transport problem
    #[error("request failed: {0}")]
    Transport(String),

    /// The request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),

    /// Operator input rejected before any request was sent
    #[error("{0}")]
    InvalidInput(String),

    /// The operator input stream could not be read
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),
}

impl ClientError {
    /// True for failures of the request itself, as opposed to local input problems
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout | Self::Status { .. } | Self::Decode(_)
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
