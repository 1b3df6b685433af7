//! Field validators shared by the service and the operator client.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Prices typed by an operator must carry exactly two decimals ("12.99").
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d{2}$").expect("price pattern is valid"));

/// Parse an operator-entered price in the `\d+.\d\d` form.
///
/// # Errors
/// Returns `Error::InvalidInput` if the text is not in that form.
pub fn parse_price_text(input: &str) -> Result<f64> {
    let input = input.trim();
    if !PRICE_RE.is_match(input) {
        return Err(Error::invalid_input(format!(
            "price '{input}' must be a number with two decimals, e.g. 12.99"
        )));
    }
    let value = input
        .parse::<f64>()
        .map_err(|e| Error::invalid_input(format!("price '{input}': {e}")))?;
    normalize_price(value)
}

/// Check that a price is finite and non-negative, rounding it to cents.
///
/// Values too large to round to cents are rejected. Negative zero becomes zero.
///
/// # Errors
/// Returns `Error::InvalidInput` for negative, NaN or infinite values.
pub fn normalize_price(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_input(format!(
            "price must be a non-negative number, got {value}"
        )));
    }
    let rounded = (value * 100.0).round() / 100.0;
    if !rounded.is_finite() {
        return Err(Error::invalid_input(format!("price {value} is too large")));
    }
    Ok(rounded.abs())
}

/// Parse one of the two accepted yes/no tokens (`y` or `n`, any case).
///
/// Returns `None` for anything else, including blank input.
#[must_use]
pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

/// Reject blank text fields.
///
/// # Errors
/// Returns `Error::InvalidInput` naming `field` when `value` is blank.
pub fn require_text(field: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}
