//! Core types for the bookstore catalog
//!
//! `Book` is the persisted record. Requests arrive as loosely typed wire
//! payloads (`CreateBookRequest`, `UpdateBookRequest`) and are validated
//! into `NewBook` and `BookPatch` before they reach the store.

use crate::error::{Error, Result};
use crate::validate::{normalize_price, require_text};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A catalog record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique, immutable identifier
    pub id: String,
    pub title: String,
    pub author: String,
    /// Non-negative price with two-decimal precision
    pub price: f64,
    pub in_stock: bool,
}

impl Book {
    /// Check the record invariants: non-empty title and author, valid price.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invalid_input("id must not be empty"));
        }
        require_text("title", &self.title)?;
        require_text("author", &self.author)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::invalid_input(format!(
                "price of book {} must be a non-negative number",
                self.id
            )));
        }
        Ok(())
    }

    /// Case-insensitive substring match against title or author.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }
}

/// Validate a whole document: every record valid, ids unique.
///
/// # Errors
/// Returns `Error::InvalidInput` for the first invalid record or duplicate id.
pub fn validate_books(books: &[Book]) -> Result<()> {
    let mut seen = HashSet::with_capacity(books.len());
    for book in books {
        book.validate()?;
        if !seen.insert(book.id.as_str()) {
            return Err(Error::invalid_input(format!("duplicate book id {}", book.id)));
        }
    }
    Ok(())
}

/// The books written to a fresh document on first start.
#[must_use]
pub fn sample_books() -> Vec<Book> {
    vec![
        Book {
            id: "1".to_string(),
            title: "To Kill a Mockingbird".to_string(),
            author: "Harper Lee".to_string(),
            price: 12.99,
            in_stock: true,
        },
        Book {
            id: "2".to_string(),
            title: "1984".to_string(),
            author: "George Orwell".to_string(),
            price: 10.99,
            in_stock: true,
        },
        Book {
            id: "3".to_string(),
            title: "The Great Gatsby".to_string(),
            author: "F. Scott Fitzgerald".to_string(),
            price: 11.50,
            in_stock: false,
        },
    ]
}

/// A price as it appears on the wire: a JSON number or a numeric string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Coerce to a non-negative price rounded to cents.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if the value is not a non-negative number.
    pub fn resolve(&self) -> Result<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::invalid_input(format!("price '{s}' is not a number")))?,
        };
        normalize_price(value)
    }
}

/// Validated fields of a book that has not been assigned an id
#[derive(Clone, Debug, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub price: f64,
    pub in_stock: bool,
}

impl NewBook {
    /// Attach an id, producing a full record.
    #[must_use]
    pub fn with_id(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            price: self.price,
            in_stock: self.in_stock,
        }
    }
}

/// Body of a create request
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl CreateBookRequest {
    /// Validate into a `NewBook`; `in_stock` defaults to true.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` if a required field is missing or invalid.
    pub fn validate(self) -> Result<NewBook> {
        let (Some(title), Some(author), Some(price)) = (self.title, self.author, self.price)
        else {
            return Err(Error::invalid_input(
                "Missing required fields: title, author, price",
            ));
        };
        Ok(NewBook {
            title: require_text("title", &title)?,
            author: require_text("author", &author)?,
            price: price.resolve()?,
            in_stock: self.in_stock.unwrap_or(true),
        })
    }
}

impl From<&NewBook> for CreateBookRequest {
    fn from(book: &NewBook) -> Self {
        Self {
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            price: Some(PriceInput::Number(book.price)),
            in_stock: Some(book.in_stock),
        }
    }
}

/// Body of an update request; every field is optional
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl UpdateBookRequest {
    /// Validate into a `BookPatch` for the book at `path_id`.
    ///
    /// A present field must be valid; it is never treated as absent. An `id`
    /// in the body must match `path_id` because ids are immutable.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` for blank text, a bad price or an id mismatch.
    pub fn validate(self, path_id: &str) -> Result<BookPatch> {
        if let Some(id) = &self.id {
            if id != path_id {
                return Err(Error::invalid_input(format!(
                    "book id {id} in body does not match {path_id}; ids cannot be changed"
                )));
            }
        }
        Ok(BookPatch {
            title: self
                .title
                .map(|t| require_text("title", &t))
                .transpose()?,
            author: self
                .author
                .map(|a| require_text("author", &a))
                .transpose()?,
            price: self.price.map(|p| p.resolve()).transpose()?,
            in_stock: self.in_stock,
        })
    }
}

/// A validated partial update: each field is present-with-value or absent
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

impl BookPatch {
    /// True if no field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.price.is_none()
            && self.in_stock.is_none()
    }

    /// Merge present fields into `book`; absent fields keep their value.
    pub fn apply(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title.clone_from(title);
        }
        if let Some(author) = &self.author {
            book.author.clone_from(author);
        }
        if let Some(price) = self.price {
            book.price = price;
        }
        if let Some(in_stock) = self.in_stock {
            book.in_stock = in_stock;
        }
    }
}

impl From<&Book> for BookPatch {
    /// A patch carrying every field of `book`.
    fn from(book: &Book) -> Self {
        Self {
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            price: Some(book.price),
            in_stock: Some(book.in_stock),
        }
    }
}

/// Acknowledgement returned by a delete
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
}

impl DeleteAck {
    #[must_use]
    pub fn for_id(id: &str) -> Self {
        Self {
            message: format!("Book with ID {id} deleted successfully"),
        }
    }
}
