//! HTTP client for the bookstore API.

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use bookstore_common::{Book, BookPatch, ClientConfig, CreateBookRequest, DeleteAck, NewBook};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Remote book operations
#[async_trait]
pub trait BookApi: Send + Sync {
    async fn list_books(&self) -> Result<Vec<Book>>;

    /// `Ok(None)` if the server has no book with `id`.
    async fn get_book(&self, id: &str) -> Result<Option<Book>>;

    async fn create_book(&self, book: &NewBook) -> Result<Book>;

    async fn update_book(&self, id: &str, patch: &BookPatch) -> Result<Book>;

    async fn delete_book(&self, id: &str) -> Result<DeleteAck>;

    async fn search_books(&self, query: &str) -> Result<Vec<Book>>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// reqwest-backed [`BookApi`] implementation
pub struct BookstoreClient {
    base_url: String,
    http: reqwest::Client,
}

impl BookstoreClient {
    /// Create a client for `config.base_url` with the configured timeout.
    ///
    /// # Errors
    /// Returns `ClientError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL including the `/api` prefix
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn books_url(&self) -> String {
        format!("{}/books", self.base_url)
    }

    fn book_url(&self, id: &str) -> String {
        format!("{}/books/{}", self.base_url, urlencoding::encode(id))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }
        Ok(response.json::<T>().await?)
    }
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    ClientError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl BookApi for BookstoreClient {
    async fn list_books(&self) -> Result<Vec<Book>> {
        self.send(self.http.get(self.books_url())).await
    }

    async fn get_book(&self, id: &str) -> Result<Option<Book>> {
        let response = self.http.get(self.book_url(id)).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Book {} not found", id);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }
        Ok(Some(response.json().await?))
    }

    async fn create_book(&self, book: &NewBook) -> Result<Book> {
        let body = CreateBookRequest::from(book);
        self.send(self.http.post(self.books_url()).json(&body)).await
    }

    async fn update_book(&self, id: &str, patch: &BookPatch) -> Result<Book> {
        self.send(self.http.put(self.book_url(id)).json(patch)).await
    }

    async fn delete_book(&self, id: &str) -> Result<DeleteAck> {
        self.send(self.http.delete(self.book_url(id))).await
    }

    async fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        let url = format!("{}/search", self.books_url());
        self.send(self.http.get(url).query(&[("query", query)])).await
    }
}
