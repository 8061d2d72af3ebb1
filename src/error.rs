//! Error taxonomy for the REST surface and the store.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// Failures inside the Sled-backed store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store unavailable: {0}")]
    Db(#[from] sled::Error),
    #[error("stored document is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Outcomes a handler can reject a request with.
///
/// Store failures are converted to `Internal` at the handler boundary; the
/// detail is logged, the caller only ever sees a generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required fields: {}", .0.join(", "))]
    BadRequest(Vec<&'static str>),
    #[error("authentication required")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn internal(detail: impl ToString) -> Self {
        Self::Internal(detail.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(detail) = &self {
            error!(%detail, "request failed");
        }
        let body = Json(serde_json::json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_lists_missing_fields() {
        let err = ApiError::BadRequest(vec!["email", "password"]);
        assert_eq!(err.to_string(), "missing required fields: email, password");
    }

    #[test]
    fn internal_error_leaks_no_detail() {
        let err = ApiError::internal("sled: io error at segment 3");
        assert_eq!(err.to_string(), "Internal server error");
    }
}
