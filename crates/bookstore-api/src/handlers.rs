//! Axum route handlers for the book endpoints.
//!
//! Handlers validate the request before touching the store. Reads and
//! searches wait out their simulated latency before loading the document;
//! mutations wait it out while holding the store's write session, so no
//! other request can observe the document until the write is committed.

use crate::error::ApiError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bookstore_common::{
    Book, CreateBookRequest, DeleteAck, LatencyConfig, UpdateBookRequest,
};
use bookstore_store::BookStore;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, ApiError>;

/// Shared state for the book handlers.
pub struct AppState {
    pub store: BookStore,
    pub latency: LatencyConfig,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// `GET /api/books`: list all books in stored order.
///
/// # Errors
/// Returns `ApiError` if the document cannot be read.
pub async fn list_books(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Book>>> {
    simulate_latency(state.latency.read()).await;
    Ok(Json(state.store.list().await?))
}

/// `GET /api/books/{id}`: load a single book.
///
/// # Errors
/// Returns `ApiError` (404) if the book does not exist.
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Book>> {
    simulate_latency(state.latency.read()).await;
    Ok(Json(state.store.get(&id).await?))
}

/// `POST /api/books`: create a book.
///
/// # Errors
/// Returns `ApiError` (400) if `title`, `author` or `price` is missing or invalid.
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateBookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>)> {
    let Json(req) = payload?;
    let new_book = req.validate().inspect_err(|e| debug!("Rejected create: {}", e))?;

    let session = state.store.begin_write().await;
    simulate_latency(state.latency.write()).await;
    let book = session.create(new_book)?;
    drop(session);

    info!("Created book {} ({})", book.id, book.title);
    Ok((StatusCode::CREATED, Json(book)))
}

/// `PUT /api/books/{id}`: merge the supplied fields into a book.
///
/// # Errors
/// Returns `ApiError` (404) for an unknown id, (400) for an invalid payload.
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateBookRequest>, JsonRejection>,
) -> Result<Json<Book>> {
    let Json(req) = payload?;
    let patch = req
        .validate(&id)
        .inspect_err(|e| debug!("Rejected update of {}: {}", id, e))?;

    let session = state.store.begin_write().await;
    simulate_latency(state.latency.write()).await;
    let book = session.update(&id, &patch)?;
    drop(session);

    info!("Updated book {}", book.id);
    Ok(Json(book))
}

/// `DELETE /api/books/{id}`: remove a book.
///
/// # Errors
/// Returns `ApiError` (404) if the book does not exist.
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>> {
    let session = state.store.begin_write().await;
    simulate_latency(state.latency.write()).await;
    let removed = session.delete(&id)?;
    drop(session);

    info!("Deleted book {} ({})", removed.id, removed.title);
    Ok(Json(DeleteAck::for_id(&id)))
}

/// `GET /api/books/search?query=`: match title or author, ignoring case.
///
/// # Errors
/// Returns `ApiError` (400) if the query is missing or blank.
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Book>>> {
    let Query(params) = params?;
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ApiError::bad_request("Search query is required"));
    }

    simulate_latency(state.latency.search()).await;
    Ok(Json(state.store.search(&query).await?))
}

/// Fallback for unknown routes.
pub async fn fallback() -> ApiError {
    ApiError::not_found("The requested URL was not found on the server")
}
