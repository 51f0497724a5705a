//! Service discovery handler: `GET /.well-known/tessel`.

use axum::{extract::State, Json};
use tessel_api::ServiceInfo;

use super::AppState;
use crate::error::AppError;

/// `GET /.well-known/tessel`
///
/// Lists every mounted resource with the methods its model currently
/// supports. Introspection may call resource handlers, so it runs on the
/// blocking pool like regular dispatch.
pub async fn well_known(State(state): State<AppState>) -> Result<Json<ServiceInfo>, AppError> {
    let app = state.app;
    let info = tokio::task::spawn_blocking(move || app.service_info())
        .await
        .map_err(|e| AppError::Internal(format!("introspection task failed: {e}")))?;
    Ok(Json(info))
}

/// Fallback for paths no route matches.
pub async fn not_found(uri: axum::http::Uri) -> AppError {
    AppError::NotFound(format!("no resource at {}", uri.path()))
}
