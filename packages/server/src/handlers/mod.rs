//! HTTP request handlers.
//!
//! Every mounted resource shares one generic handler in [`resource`];
//! [`discovery`] serves the service document. Handlers receive Axum
//! extractors and return `Result<Response, AppError>`.

pub mod discovery;
pub mod resource;

use std::sync::Arc;

use crate::routes::App;

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
    /// Largest request body read, in bytes.
    pub body_limit: usize,
}
