//! The handler behind every mounted resource.
//!
//! Reads the body, converts path parameters to URL arguments and runs the
//! synchronous [`App::handle`](crate::routes::App::handle) on tokio's
//! blocking pool, then turns the rendered result into an axum response.

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::Response,
};
use serde_json::Value;
use tessel::{Method, UrlArgs};

use super::AppState;
use crate::error::AppError;
use crate::routes::Rendered;

/// Dispatch `req` to the route at `index` with the extracted path `params`.
pub async fn dispatch(
    state: AppState,
    index: usize,
    params: HashMap<String, String>,
    req: Request,
) -> Result<Response, AppError> {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, state.body_limit)
        .await
        .map_err(|e| AppError::BadRequest(format!("could not read request body: {e}")))?;

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let method = Method::from(parts.method.as_str());
    let url_args: UrlArgs = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    let app = state.app;
    let rendered = tokio::task::spawn_blocking(move || {
        app.handle(index, method, content_type.as_deref(), &bytes, &url_args)
    })
    .await
    .map_err(|e| AppError::Internal(format!("dispatch task failed: {e}")))??;

    into_response(rendered)
}

fn into_response(rendered: Rendered) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(rendered.status)
        .map_err(|_| AppError::Internal(format!("invalid status {}", rendered.status)))?;

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, rendered.content_type);
    for (name, value) in rendered.headers {
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(n), Ok(v)) => builder = builder.header(n, v),
            _ => tracing::warn!("dropping unrepresentable header {name}: {value:?}"),
        }
    }
    builder
        .body(Body::from(rendered.body))
        .map_err(|e| AppError::Internal(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
