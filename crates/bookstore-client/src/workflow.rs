//! Operator workflows for creating, updating and deleting remote books.
//!
//! Update and delete always fetch the current remote record first and
//! abort if it is gone. Update merges operator input field by field into
//! the fetched record: a blank answer keeps the fetched value, an invalid
//! answer is never merged and the same field is asked again. Delete sends
//! nothing until the operator answers `y`.
//!
//! There is no isolation between the fetch and the submit; a concurrent
//! change by another client between the two is overwritten.

use crate::api::BookApi;
use crate::error::{ClientError, Result};
use crate::prompt::Prompter;
use bookstore_common::validate::{parse_price_text, parse_yes_no, require_text};
use bookstore_common::{Book, BookPatch, DeleteAck, NewBook};
use tracing::{debug, info};

/// Result of the update workflow
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Book),
    NotFound,
}

/// Result of the delete workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(DeleteAck),
    Cancelled,
    NotFound,
}

/// Ask for a book id. Blank input yields `None`.
///
/// # Errors
/// Returns `ClientError::Input` if input cannot be read.
pub fn prompt_book_id(prompter: &mut impl Prompter) -> Result<Option<String>> {
    let id = prompter.ask("Enter book ID: ")?;
    let id = id.trim();
    if id.is_empty() {
        prompter.say("No book ID was entered.");
        return Ok(None);
    }
    Ok(Some(id.to_string()))
}

/// Search by title or author; a blank query is rejected without a request.
///
/// # Errors
/// Returns `ClientError::InvalidInput` for a blank query, or the request error.
pub async fn search(api: &(impl BookApi + ?Sized), query: &str) -> Result<Vec<Book>> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ClientError::InvalidInput("No search query was entered.".to_string()));
    }
    api.search_books(query).await
}

/// Collect a new book from the operator and submit it once.
///
/// Blank or invalid answers re-ask the same field; a blank in-stock answer
/// means yes.
///
/// # Errors
/// Returns `ClientError::Input` if input ends, or the request error.
pub async fn create_book(
    api: &(impl BookApi + ?Sized),
    prompter: &mut impl Prompter,
) -> Result<Book> {
    let title = ask_required(prompter, "Title: ", |s| require_text("title", s))?;
    let author = ask_required(prompter, "Author: ", |s| require_text("author", s))?;
    let price = ask_required(prompter, "Price ($, e.g. 12.99): ", parse_price_text)?;
    let in_stock = ask_optional(prompter, "In stock? (Y/n): ", parse_stock_token)?.unwrap_or(true);

    let book = api
        .create_book(&NewBook {
            title,
            author,
            price,
            in_stock,
        })
        .await?;
    info!("Created book {}", book.id);
    Ok(book)
}

/// Fetch book `id`, let the operator edit it, and submit the merged record.
///
/// Leaving every field blank submits a payload identical to the fetched
/// record. Transport failures are returned as-is; nothing is retried.
///
/// # Errors
/// Returns `ClientError::Input` if input ends, or the request error.
pub async fn update_book(
    api: &(impl BookApi + ?Sized),
    prompter: &mut impl Prompter,
    id: &str,
) -> Result<UpdateOutcome> {
    let Some(current) = api.get_book(id).await? else {
        return Ok(UpdateOutcome::NotFound);
    };

    prompter.say("Leave a field empty to keep its current value.");
    let edits = BookPatch {
        title: ask_optional(
            prompter,
            &format!("Title [{}]: ", current.title),
            |s| require_text("title", s),
        )?,
        author: ask_optional(
            prompter,
            &format!("Author [{}]: ", current.author),
            |s| require_text("author", s),
        )?,
        price: ask_optional(
            prompter,
            &format!("Price [${:.2}]: ", current.price),
            parse_price_text,
        )?,
        in_stock: ask_optional(
            prompter,
            &format!("In stock [{}] (y/n): ", if current.in_stock { "y" } else { "n" }),
            parse_stock_token,
        )?,
    };
    debug!("Edits for book {}: {:?}", id, edits);

    let mut merged = current;
    edits.apply(&mut merged);

    let updated = api.update_book(id, &BookPatch::from(&merged)).await?;
    Ok(UpdateOutcome::Updated(updated))
}

/// Fetch book `id`, ask for confirmation, and delete it only on `y`.
///
/// `n` cancels without a request; any other answer asks again.
///
/// # Errors
/// Returns `ClientError::Input` if input ends, or the request error.
pub async fn delete_book(
    api: &(impl BookApi + ?Sized),
    prompter: &mut impl Prompter,
    id: &str,
) -> Result<DeleteOutcome> {
    let Some(book) = api.get_book(id).await? else {
        return Ok(DeleteOutcome::NotFound);
    };

    prompter.say(&format!("{} by {} (ID {})", book.title, book.author, book.id));
    loop {
        let answer = prompter.ask("Are you sure you want to delete this book? (y/n): ")?;
        match parse_yes_no(&answer) {
            Some(true) => {
                let ack = api.delete_book(id).await?;
                info!("Deleted book {}", id);
                return Ok(DeleteOutcome::Deleted(ack));
            }
            Some(false) => return Ok(DeleteOutcome::Cancelled),
            None => prompter.say("Please answer y or n."),
        }
    }
}

fn parse_stock_token(input: &str) -> bookstore_common::Result<bool> {
    parse_yes_no(input).ok_or_else(|| {
        bookstore_common::Error::invalid_input("in stock value must be either y or n")
    })
}

/// Ask until the answer is blank (`None`) or parses.
fn ask_optional<T>(
    prompter: &mut impl Prompter,
    message: &str,
    parse: impl Fn(&str) -> bookstore_common::Result<T>,
) -> Result<Option<T>> {
    loop {
        let answer = prompter.ask(message)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        match parse(answer) {
            Ok(value) => return Ok(Some(value)),
            Err(e) => prompter.say(&format!("Invalid value: {}", e.message())),
        }
    }
}

/// Ask until the answer parses; blank answers are asked again.
fn ask_required<T>(
    prompter: &mut impl Prompter,
    message: &str,
    parse: impl Fn(&str) -> bookstore_common::Result<T>,
) -> Result<T> {
    loop {
        if let Some(value) = ask_optional(prompter, message, &parse)? {
            return Ok(value);
        }
        prompter.say("A value is required.");
    }
}
