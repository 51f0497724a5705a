//! Dispatch errors and their translation into responses.
//!
//! Everything that can go wrong while a resource handles a request is a
//! [`DispatchError`]. The resource never lets one escape: it hands it to its
//! [`ErrorHandler`], whose [`Response`] is sent instead.

use std::sync::Arc;

use serde_json::Value;
use tessel_api::{codes, ErrorResponse};
use thiserror::Error;

use crate::content::ContentError;
use crate::context::Response;
use crate::method::{Method, MethodSet};
use crate::model::ModelError;
use crate::validator::ValidationError;

/// The failure kinds of the dispatch pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("method {method} is not allowed; allowed: {allowed}")]
    MethodNotAllowed { method: Method, allowed: MethodSet },

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    MalformedBody(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// A broken internal invariant, e.g. a method that passed the allow
    /// check without a matching capability.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ContentError> for DispatchError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::Unsupported(_) => DispatchError::UnsupportedMediaType(e.to_string()),
            ContentError::Json(_) | ContentError::Form(_) => {
                DispatchError::MalformedBody(e.to_string())
            }
        }
    }
}

/// Turns a [`DispatchError`] into the response to send.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, err: DispatchError) -> Response;
}

impl<F> ErrorHandler for F
where
    F: Fn(DispatchError) -> Response + Send + Sync,
{
    fn handle(&self, err: DispatchError) -> Response {
        self(err)
    }
}

/// The handler installed when a resource is given none.
///
/// | Error | Status | Code |
/// |-------|--------|------|
/// | [`DispatchError::MethodNotAllowed`] | 405, with `Allow` | `method_not_allowed` |
/// | [`DispatchError::UnsupportedMediaType`] | 415 | `unsupported_media_type` |
/// | [`DispatchError::MalformedBody`] | 400 | `invalid_body` |
/// | [`ValidationError::UnexpectedFields`] | 400 | `unexpected_fields` |
/// | [`ValidationError::MissingFields`] | 400 | `missing_fields` |
/// | [`ValidationError::InvalidFields`] | 400 | `invalid_fields` |
/// | [`ModelError::NotFound`] | 404 | `not_found` |
/// | anything else | 500 | `internal_error` |
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, err: DispatchError) -> Response {
        let message = err.to_string();
        match err {
            DispatchError::MethodNotAllowed { allowed, .. } => {
                error_response(405, ErrorResponse::new(codes::METHOD_NOT_ALLOWED, message))
                    .with_header("Allow", allowed.to_string())
            }
            DispatchError::UnsupportedMediaType(_) => error_response(
                415,
                ErrorResponse::new(codes::UNSUPPORTED_MEDIA_TYPE, message),
            ),
            DispatchError::MalformedBody(_) => {
                error_response(400, ErrorResponse::new(codes::INVALID_BODY, message))
            }
            DispatchError::Validation(v) => {
                let code = match v {
                    ValidationError::UnexpectedFields(_) => codes::UNEXPECTED_FIELDS,
                    ValidationError::MissingFields(_) => codes::MISSING_FIELDS,
                    ValidationError::InvalidFields(_) => codes::INVALID_FIELDS,
                };
                error_response(
                    400,
                    ErrorResponse::new(code, message).with_fields(v.fields().iter().cloned()),
                )
            }
            DispatchError::Model(ModelError::NotFound(_)) => {
                error_response(404, ErrorResponse::new(codes::NOT_FOUND, message))
            }
            DispatchError::Model(_) | DispatchError::Internal(_) => {
                tracing::warn!("request failed: {message}");
                error_response(500, ErrorResponse::new(codes::INTERNAL_ERROR, message))
            }
        }
    }
}

pub(crate) fn default_handler() -> Arc<dyn ErrorHandler> {
    Arc::new(DefaultErrorHandler)
}

fn error_response(status: u16, body: ErrorResponse) -> Response {
    let body = serde_json::to_value(body).unwrap_or(Value::Null);
    Response::new(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let resp = DefaultErrorHandler.handle(ModelError::NotFound("note 3".into()).into());
        assert_eq!(resp.status, 404);
        assert_eq!(resp.body["code"], "not_found");
        assert_eq!(resp.body["error"], "note 3 not found");
    }

    #[test]
    fn method_not_allowed_lists_methods() {
        let err = DispatchError::MethodNotAllowed {
            method: Method::Put,
            allowed: MethodSet::readable(),
        };
        let resp = DefaultErrorHandler.handle(err);
        assert_eq!(resp.status, 405);
        assert_eq!(resp.header("Allow"), Some("GET, HEAD"));
    }

    #[test]
    fn body_errors_map_to_400_and_415() {
        let resp = DefaultErrorHandler.handle(ContentError::Unsupported("text/csv".into()).into());
        assert_eq!(resp.status, 415);
        assert_eq!(resp.body["code"], "unsupported_media_type");

        let resp = DefaultErrorHandler.handle(ContentError::Form("bad escape".into()).into());
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["code"], "invalid_body");
    }

    #[test]
    fn validation_failures_carry_every_field() {
        let err = ValidationError::InvalidFields(vec!["a".into(), "b".into()]);
        let resp = DefaultErrorHandler.handle(err.into());
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["code"], "invalid_fields");
        assert_eq!(resp.body["fields"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn other_model_failures_are_internal() {
        let resp = DefaultErrorHandler.handle(ModelError::Failed("disk on fire".into()).into());
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["code"], "internal_error");
    }
}
