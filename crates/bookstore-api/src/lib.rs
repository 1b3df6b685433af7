//! Bookstore API - REST service over the book store.
//!
//! Provides an Axum router exposing create/read/update/delete/search for
//! books under `/api`, plus `/health`.

pub mod error;
pub mod handlers;

use axum::Router;
use axum::routing::{delete, get, post, put};
use bookstore_common::LatencyConfig;
use bookstore_store::BookStore;
use handlers::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Build the service router.
pub fn router(store: BookStore, latency: LatencyConfig) -> Router {
    let state = Arc::new(AppState { store, latency });

    let books = Router::new()
        .route("/books", get(handlers::list_books))
        .route("/books", post(handlers::create_book))
        // static segment, matched before `{id}`
        .route("/books/search", get(handlers::search_books))
        .route("/books/{id}", get(handlers::get_book))
        .route("/books/{id}", put(handlers::update_book))
        .route("/books/{id}", delete(handlers::delete_book));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", books)
        .fallback(handlers::fallback)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use bookstore_common::{Book, sample_books};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app_with(latency: LatencyConfig) -> (TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let store = BookStore::open(dir.path().join("books.json")).unwrap();
        (dir, router(store, latency))
    }

    fn app() -> (TempDir, Router) {
        app_with(LatencyConfig::NONE)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_list_returns_seed_books() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::GET, "/api/books", None).await;
        assert_eq!(status, StatusCode::OK);
        let books: Vec<Book> = serde_json::from_value(body).unwrap();
        assert_eq!(books, sample_books());
    }

    #[tokio::test]
    async fn test_get_unknown_book_is_404() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::GET, "/api/books/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not Found", "message": "Book not found"}));
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (_dir, app) = app();
        let (status, created) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(json!({"title": "Dune", "author": "Frank Herbert", "price": "9.99"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["id"], "4");
        assert_eq!(created["in_stock"], true);
        assert_eq!(created["price"], 9.99);

        let (status, fetched) = send(&app, Method::GET, "/api/books/4", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let (_dir, app) = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(json!({"title": "Dune"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["message"], "Missing required fields: title, author, price");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(json!({"title": "Dune", "author": "Frank Herbert", "price": -3})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_price_leaves_catalog_readable() {
        let (_dir, app) = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(json!({"title": "Big", "author": "A", "price": 1e307})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/books/1",
            Some(json!({"price": 1e307})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/api/books", None).await;
        assert_eq!(status, StatusCode::OK);
        let books: Vec<Book> = serde_json::from_value(body).unwrap();
        assert_eq!(books, sample_books());
    }

    #[tokio::test]
    async fn test_create_requires_json_body() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::POST, "/api/books", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Request must be JSON");
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let (_dir, app) = app();
        let (status, updated) = send(
            &app,
            Method::PUT,
            "/api/books/2",
            Some(json!({"price": 15.50})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "1984");
        assert_eq!(updated["author"], "George Orwell");
        assert_eq!(updated["price"], 15.5);
    }

    #[tokio::test]
    async fn test_update_errors() {
        let (_dir, app) = app();
        let (status, _) = send(&app, Method::PUT, "/api/books/99", Some(json!({"price": 1.0}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::PUT, "/api/books/1", Some(json!({"title": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::PUT, "/api/books/1", Some(json!({"in_stock": "yes"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::PUT, "/api/books/1", Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_then_recreate_reuses_id() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::DELETE, "/api/books/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Book with ID 2 deleted successfully");

        let (status, _) = send(&app, Method::DELETE, "/api/books/2", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, created) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(json!({"title": "Dune", "author": "Frank Herbert", "price": 9.99, "in_stock": false})),
        )
        .await;
        assert_eq!(created["id"], "2");
    }

    #[tokio::test]
    async fn test_search() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::GET, "/api/books/search?query=orwell", None).await;
        assert_eq!(status, StatusCode::OK);
        let hits: Vec<Book> = serde_json::from_value(body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].author, "George Orwell");

        for uri in ["/api/books/search?query=", "/api/books/search"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["message"], "Search query is required");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_uses_error_envelope() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_are_not_lost() {
        let latency = LatencyConfig {
            write_ms: 20,
            ..LatencyConfig::NONE
        };
        let (_dir, app) = app_with(latency);

        let requests = (0..5).map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                send(
                    &app,
                    Method::POST,
                    "/api/books",
                    Some(json!({"title": format!("Book {i}"), "author": "A", "price": 1.0})),
                )
                .await
            })
        });
        let mut ids = Vec::new();
        for request in requests.collect::<Vec<_>>() {
            let (status, body) = request.await.unwrap();
            assert_eq!(status, StatusCode::CREATED);
            ids.push(body["id"].as_str().unwrap().to_string());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);

        let (_, body) = send(&app, Method::GET, "/api/books", None).await;
        assert_eq!(body.as_array().unwrap().len(), 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_read_never_sees_write_in_progress() {
        let latency = LatencyConfig {
            write_ms: 200,
            ..LatencyConfig::NONE
        };
        let (_dir, app) = app_with(latency);

        let writer = {
            let app = app.clone();
            tokio::spawn(async move {
                send(&app, Method::PUT, "/api/books/1", Some(json!({"price": 20.00}))).await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        // blocks until the update has been committed
        let (status, book) = send(&app, Method::GET, "/api/books/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(book["price"], 20.0);
        assert_eq!(writer.await.unwrap().0, StatusCode::OK);
    }
}
