//! Bookstore Client - talks to the bookstore REST API
//!
//! [`BookstoreClient`] wraps the HTTP endpoints behind the [`BookApi`]
//! trait. The [`workflow`] module builds the operator-facing create,
//! update and delete flows on top of it: every mutation of an existing
//! book starts by fetching the current remote value, and a delete is
//! never sent without an explicit confirmation.

pub mod api;
pub mod error;
pub mod prompt;
pub mod workflow;

pub use api::{BookApi, BookstoreClient};
pub use error::{ClientError, Result};
pub use prompt::{ConsolePrompter, Prompter};
