//! Bookstore Common - Shared types and utilities
//!
//! This crate provides the book data model, partial-update types, field
//! validators, error definitions and configuration used by the store,
//! the HTTP service and the client.

pub mod config;
pub mod error;
pub mod types;
pub mod validate;

pub use config::{ClientConfig, LatencyConfig, ServerConfig};
pub use error::{Error, Result};
pub use types::*;
