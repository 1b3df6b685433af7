//! The book record store.

use crate::document;
use bookstore_common::{Book, BookPatch, Error, NewBook, Result, sample_books, validate_books};
use std::path::{Path, PathBuf};
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, error, info};

/// File-backed catalog with single-writer, multiple-reader access.
///
/// Nothing is cached between operations: every read loads the document
/// from disk, so the file is the only source of truth between requests.
pub struct BookStore {
    path: PathBuf,
    lock: RwLock<()>,
}

impl BookStore {
    /// Open the document at `path`, seeding it with the sample books if absent.
    ///
    /// # Errors
    /// Returns `Error::Corrupt` if an existing document is malformed; the
    /// caller must not continue with an empty catalog in that case.
    /// Returns `Error::Persistence` if the document cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::persistence(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        match document::read(&path)? {
            Some(books) => {
                info!("Loaded {} books from {}", books.len(), path.display());
            }
            None => {
                let seed = sample_books();
                document::write(&path, &seed)?;
                info!("Seeded {} with {} sample books", path.display(), seed.len());
            }
        }

        Ok(Self {
            path,
            lock: RwLock::new(()),
        })
    }

    /// Path of the backing document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All books in stored order.
    ///
    /// # Errors
    /// Returns `Error::Persistence` if the document cannot be read.
    pub async fn list(&self) -> Result<Vec<Book>> {
        let _guard = self.lock.read().await;
        load(&self.path)
    }

    /// The book with `id`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if no book has that id.
    pub async fn get(&self, id: &str) -> Result<Book> {
        self.list()
            .await?
            .into_iter()
            .find(|book| book.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Books whose title or author contains `query`, ignoring case.
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` for a blank query; it never matches everything.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::invalid_input("Search query is required"));
        }
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|book| book.matches(&needle))
            .collect())
    }

    /// Append a new book under the smallest free id.
    ///
    /// # Errors
    /// Returns `Error::Persistence` if the document cannot be read or written.
    pub async fn create(&self, book: NewBook) -> Result<Book> {
        self.begin_write().await.create(book)
    }

    /// Merge `patch` into the book with `id`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id, `Error::Persistence` on I/O failure.
    pub async fn update(&self, id: &str, patch: &BookPatch) -> Result<Book> {
        self.begin_write().await.update(id, patch)
    }

    /// Remove the book with `id`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id, `Error::Persistence` on I/O failure.
    pub async fn delete(&self, id: &str) -> Result<Book> {
        self.begin_write().await.delete(id)
    }

    /// Take exclusive access to the document.
    ///
    /// Readers and other writers wait until the session is dropped, so work
    /// done while holding it (including simulated latency) is never observed
    /// half-way.
    pub async fn begin_write(&self) -> WriteSession<'_> {
        WriteSession {
            path: &self.path,
            _guard: self.lock.write().await,
        }
    }
}

/// Exclusive access to the document for one or more load-mutate-save cycles.
pub struct WriteSession<'a> {
    path: &'a Path,
    _guard: RwLockWriteGuard<'a, ()>,
}

impl WriteSession<'_> {
    /// Current contents of the document.
    ///
    /// # Errors
    /// Returns `Error::Persistence` if the document cannot be read.
    pub fn snapshot(&self) -> Result<Vec<Book>> {
        load(self.path)
    }

    /// See [`BookStore::create`].
    ///
    /// # Errors
    /// Returns `Error::Persistence` if the document cannot be read or written.
    pub fn create(&self, book: NewBook) -> Result<Book> {
        self.mutate(|books| {
            let created = book.with_id(document::next_id(books));
            books.push(created.clone());
            Ok(created)
        })
    }

    /// See [`BookStore::update`].
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id, `Error::Persistence` on I/O failure.
    pub fn update(&self, id: &str, patch: &BookPatch) -> Result<Book> {
        self.mutate(|books| {
            let book = books
                .iter_mut()
                .find(|book| book.id == id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            patch.apply(book);
            Ok(book.clone())
        })
    }

    /// See [`BookStore::delete`]. Returns the removed book.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for an unknown id, `Error::Persistence` on I/O failure.
    pub fn delete(&self, id: &str) -> Result<Book> {
        self.mutate(|books| {
            let index = books
                .iter()
                .position(|book| book.id == id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            Ok(books.remove(index))
        })
    }

    /// Load, apply `op`, save. Nothing is written if `op` fails or leaves an
    /// invalid record behind, and a failed save discards the in-memory result.
    fn mutate<T>(&self, op: impl FnOnce(&mut Vec<Book>) -> Result<T>) -> Result<T> {
        let mut books = load(self.path)?;
        let out = op(&mut books)?;
        validate_books(&books)?;
        if let Err(e) = document::write(self.path, &books) {
            error!("Failed to persist {}: {}", self.path.display(), e);
            return Err(e);
        }
        debug!("Committed {} books to {}", books.len(), self.path.display());
        Ok(out)
    }
}

/// Read the document during normal operation.
///
/// A document that was valid at startup but no longer parses is reported
/// as a persistence failure of this request, not a fatal error.
fn load(path: &Path) -> Result<Vec<Book>> {
    match document::read(path) {
        Ok(Some(books)) => Ok(books),
        Ok(None) => Err(Error::persistence(format!(
            "book document {} disappeared",
            path.display()
        ))),
        Err(e @ Error::Corrupt { .. }) => Err(Error::persistence(e.to_string())),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, BookStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = BookStore::open(dir.path().join("data").join("books.json")).unwrap();
        (dir, store)
    }

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Test Author".to_string(),
            price: 9.99,
            in_stock: true,
        }
    }

    #[tokio::test]
    async fn test_open_seeds_sample_books() {
        let (_dir, store) = open_temp();
        let books = store.list().await.unwrap();
        assert_eq!(books, sample_books());
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        std::fs::write(&path, "{ not a list").unwrap();

        assert!(matches!(BookStore::open(&path), Err(Error::Corrupt { .. })));
        // the corrupt document is left for the operator to inspect
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not a list");
    }

    #[tokio::test]
    async fn test_reopen_reads_existing_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.json");
        let created = {
            let store = BookStore::open(&path).unwrap();
            store.create(new_book("Dune")).await.unwrap()
        };

        let store = BookStore::open(&path).unwrap();
        assert_eq!(store.get(&created.id).await.unwrap(), created);
        assert_eq!(store.list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let (_dir, store) = open_temp();
        let created = store.create(new_book("Dune")).await.unwrap();
        assert_eq!(created.id, "4");
        assert_eq!(store.get("4").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_reuses_freed_id() {
        let (_dir, store) = open_temp();
        store.delete("2").await.unwrap();
        let created = store.create(new_book("Dune")).await.unwrap();
        assert_eq!(created.id, "2");

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[tokio::test]
    async fn test_update_merges_present_fields() {
        let (_dir, store) = open_temp();
        let patch = BookPatch {
            price: Some(15.50),
            ..Default::default()
        };
        let updated = store.update("2", &patch).await.unwrap();
        assert_eq!(updated.title, "1984");
        assert_eq!(updated.author, "George Orwell");
        assert!((updated.price - 15.50).abs() < f64::EPSILON);
        assert_eq!(store.get("2").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (_dir, store) = open_temp();
        assert!(store.get("42").await.unwrap_err().is_not_found());
        assert!(
            store
                .update("42", &BookPatch::default())
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(store.delete("42").await.unwrap_err().is_not_found());
        assert_eq!(store.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (_dir, store) = open_temp();
        let hits = store.search("orwell").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].author, "George Orwell");

        let hits = store.search("THE").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "3");

        assert!(store.search("tolkien").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_search_is_invalid_input() {
        let (_dir, store) = open_temp();
        for query in ["", "   "] {
            assert!(matches!(
                store.search(query).await,
                Err(Error::InvalidInput(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_write_failure_discards_mutation() {
        let (_dir, store) = open_temp();
        let mut temp = store.path().as_os_str().to_os_string();
        temp.push(".tmp");
        std::fs::create_dir(&temp).unwrap();

        let err = store.create(new_book("Dune")).await.unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(store.list().await.unwrap(), sample_books());
    }

    #[tokio::test]
    async fn test_invalid_record_is_never_saved() {
        let (_dir, store) = open_temp();
        let patch = BookPatch {
            price: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(matches!(
            store.update("1", &patch).await,
            Err(Error::InvalidInput(_))
        ));

        let book = NewBook {
            price: f64::NAN,
            ..new_book("Dune")
        };
        assert!(matches!(store.create(book).await, Err(Error::InvalidInput(_))));

        assert_eq!(store.list().await.unwrap(), sample_books());
        BookStore::open(store.path()).unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (_dir, store) = open_temp();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create(new_book(&format!("Book {i}"))).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_by_key(|id| id.parse::<u32>().unwrap());
        let expected: Vec<String> = (4..20).map(|n: u32| n.to_string()).collect();
        assert_eq!(ids, expected);

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 19);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reader_waits_for_write_session() {
        let (_dir, store) = open_temp();
        let store = Arc::new(store);

        let session = store.begin_write().await;
        let reader = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.list().await.unwrap().len() })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!reader.is_finished());

        session.create(new_book("Dune")).unwrap();
        drop(session);
        assert_eq!(reader.await.unwrap(), 4);
    }
}
