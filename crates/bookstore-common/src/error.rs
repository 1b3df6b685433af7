//! Error types for the bookstore
//!
//! This module defines the error taxonomy shared by the store, the HTTP
//! service and the configuration loader.

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for bookstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for bookstore operations
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed fields, empty search query
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("book not found: {0}")]
    NotFound(String),

    /// Durable read or write failed while serving a request
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// The persisted document could not be parsed or violates a record invariant
    #[error("corrupt book document {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a corruption error for the document at `path`
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a not found error
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::Persistence(_) | Self::Corrupt { .. } | Self::Configuration(_) => 500,
        }
    }

    /// Short label used in the `error` field of JSON error bodies
    #[must_use]
    pub const fn error_label(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "Bad Request",
            Self::NotFound(_) => "Not Found",
            Self::Persistence(_) | Self::Corrupt { .. } | Self::Configuration(_) => {
                "Internal Server Error"
            }
        }
    }

    /// Human readable message without the variant prefix
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::NotFound(_) => "Book not found".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_http_status() {
        assert_eq!(Error::invalid_input("x").http_status_code(), 400);
        assert_eq!(Error::NotFound("7".into()).http_status_code(), 404);
        assert_eq!(Error::persistence("disk full").http_status_code(), 500);
        assert_eq!(Error::corrupt("/tmp/books.json", "eof").http_status_code(), 500);
    }

    #[test]
    fn test_error_not_found() {
        assert!(Error::NotFound("1".into()).is_not_found());
        assert!(!Error::invalid_input("bad").is_not_found());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            Error::invalid_input("Search query is required").message(),
            "Search query is required"
        );
        assert_eq!(Error::NotFound("9".into()).message(), "Book not found");
        assert!(Error::persistence("disk full").message().contains("disk full"));
    }
}
