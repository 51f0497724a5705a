//! Transport-level errors.
//!
//! Failures inside dispatch never reach this module: a resource's error
//! handler turns them into a response. What remains are problems the
//! binding hits around dispatch (unreadable bodies, unknown paths, a
//! crashed worker) and problems assembling the application at start-up.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tessel::SpecError;
use tessel_api::{codes, ErrorResponse};
use thiserror::Error;

/// An error that a handler can return; converts directly to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, codes::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, codes::INVALID_BODY, msg),
            AppError::Internal(msg) => {
                tracing::warn!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, codes::INTERNAL_ERROR, msg)
            }
        };
        let body = ErrorResponse::new(code, message);
        (status, Json(body)).into_response()
    }
}

/// A problem assembling the application. Aborts start-up.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("resource name {0:?} is mounted twice")]
    DuplicateName(String),

    #[error("path {0:?} is mounted twice")]
    DuplicatePath(String),
}
