//! Assembles the Axum [`Router`] from a built [`App`].

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    handlers::{discovery, resource, AppState},
    routes::App,
};

/// Build the complete application router with shared state.
///
/// Every route of `app` is mounted for all methods; which ones succeed is
/// up to the resource.
pub fn build_router(app: Arc<App>, config: &ServerConfig) -> Router {
    let state = AppState {
        app: Arc::clone(&app),
        body_limit: config.body_limit,
    };

    let mut router: Router<AppState> =
        Router::new().route("/.well-known/tessel", get(discovery::well_known));

    for (index, route) in app.routes().iter().enumerate() {
        // Path<_> rejects routes without parameters, so those get their own
        // extractor list.
        let handler = if route.params().is_empty() {
            any(move |State(state): State<AppState>, req: Request| {
                resource::dispatch(state, index, HashMap::new(), req)
            })
        } else {
            any(
                move |State(state): State<AppState>,
                      Path(params): Path<HashMap<String, String>>,
                      req: Request| { resource::dispatch(state, index, params, req) },
            )
        };
        router = router.route(route.path(), handler);
    }

    router
        .fallback(discovery::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
