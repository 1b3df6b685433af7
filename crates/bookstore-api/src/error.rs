//! REST API error types.
//!
//! Error responses use the format `{"error": "...", "message": "..."}`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

/// REST API error.
#[derive(Debug)]
pub struct ApiError {
    pub code: StatusCode,
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::BAD_REQUEST,
            error: "Bad Request".to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::NOT_FOUND,
            error: "Not Found".to_string(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::INTERNAL_SERVER_ERROR,
            error: "Internal Server Error".to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.error,
            message: self.message,
        };
        (self.code, axum::Json(body)).into_response()
    }
}

impl From<bookstore_common::Error> for ApiError {
    fn from(err: bookstore_common::Error) -> Self {
        let code = StatusCode::from_u16(err.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if code.is_server_error() {
            error!("Request failed: {}", err);
        }
        Self {
            code,
            error: err.error_label().to_string(),
            message: err.message(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => Self::bad_request("Request must be JSON"),
            other => Self::bad_request(other.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
