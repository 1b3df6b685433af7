//! On-disk representation of the catalog: one JSON array of books.

use bookstore_common::{Book, Error, Result, validate_books};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Read and validate the document at `path`.
///
/// Returns `Ok(None)` if the file does not exist.
///
/// # Errors
/// Returns `Error::Corrupt` if the file is not a JSON array of valid books
/// with unique ids, and `Error::Persistence` if it cannot be read.
pub fn read(path: &Path) -> Result<Option<Vec<Book>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::persistence(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    let books: Vec<Book> =
        serde_json::from_slice(&bytes).map_err(|e| Error::corrupt(path, e.to_string()))?;
    validate_books(&books).map_err(|e| Error::corrupt(path, e.message()))?;
    Ok(Some(books))
}

/// Replace the document at `path` with `books`.
///
/// The collection is written to a sibling temporary file, synced, and then
/// renamed over the document, so a failed write leaves the previous
/// document untouched.
///
/// # Errors
/// Returns `Error::Persistence` if any step fails.
pub fn write(path: &Path, books: &[Book]) -> Result<()> {
    let temp_path = temp_path(path);
    {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| {
                Error::persistence(format!("failed to create {}: {e}", temp_path.display()))
            })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, books)
            .map_err(|e| Error::persistence(format!("failed to serialize books: {e}")))?;
        writer
            .flush()
            .map_err(|e| Error::persistence(format!("failed to flush books: {e}")))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| Error::persistence(format!("failed to sync books: {e}")))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        // Best effort; the temporary file is never read back.
        let _ = fs::remove_file(&temp_path);
        Error::persistence(format!("failed to replace {}: {e}", path.display()))
    })
}

/// Smallest positive integer id not used by any numeric id in `books`.
///
/// Ids freed by deletion are reused. Non-numeric ids are ignored.
#[must_use]
pub fn next_id(books: &[Book]) -> String {
    let used: HashSet<u64> = books
        .iter()
        .filter_map(|book| book.id.parse::<u64>().ok())
        .collect();
    let mut candidate = 1u64;
    while used.contains(&candidate) {
        candidate += 1;
    }
    candidate.to_string()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
