//! HTTP-facing error type.
//!
//! # Design
//! Handlers return `Result<_, ApiError>`; the `IntoResponse` impl is the one
//! place where store outcomes become status codes. The message is passed
//! through as a plain-text body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use thiserror::Error;
use todo_core::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed body or path.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(StoreError),

    /// The blocking task running a store call did not complete.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Duplicate(_) => ApiError::Conflict(err.to_string()),
            other => ApiError::Storage(other),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("event=http_error module=api status={} error={}", status.as_u16(), self);
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::TodoId;

    #[test]
    fn store_errors_map_to_statuses() {
        let not_found: ApiError = StoreError::NotFound(TodoId::from("x")).into();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "todo not found: x");

        let duplicate: ApiError = StoreError::Duplicate(TodoId::from("x")).into();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let closed: ApiError = StoreError::NotInitialized.into();
        assert_eq!(closed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(matches!(closed, ApiError::Storage(StoreError::NotInitialized)));
    }

    #[test]
    fn invalid_input_is_bad_request() {
        let err = ApiError::InvalidInput("missing id".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
