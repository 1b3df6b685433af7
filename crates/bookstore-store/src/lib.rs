//! Bookstore Store - durable CRUD over the book catalog
//!
//! The catalog lives in a single JSON document that is read in full at the
//! start of every operation and rewritten in full after every mutation.
//! A reader/writer lock linearizes mutations: a writer holds exclusive
//! access for the whole load-mutate-save cycle, so concurrent creates never
//! lose each other's records and readers never observe a half-written file.

pub mod document;
pub mod store;

pub use store::{BookStore, WriteSession};
