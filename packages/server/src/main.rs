//! `tessel-server`: serves the notes demo application over HTTP.
//!
//! # Quick start
//!
//! ```sh
//! # Default port:
//! tessel-server
//!
//! # Custom bind address, collections validated only by their own rules:
//! TESSEL_BIND=127.0.0.1:8080 TESSEL_INHERIT_RULES=false tessel-server
//! ```
//!
//! # Environment variables
//!
//! See [`config::ServerConfig::from_env`] for the full list.

mod config;
mod demo;
mod error;
mod handlers;
mod router;
mod routes;
mod storage;

use std::sync::Arc;

use config::ServerConfig;
use storage::{memory::MemoryStorage, Storage};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tessel_server=info,tessel=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("config: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!("storage: in-memory (data will not survive restart)");
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    let app = demo::notes_app(storage, &config)
        .unwrap_or_else(|e| panic!("failed to assemble the application: {e}"));
    let router = router::build_router(Arc::new(app), &config);

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    axum::serve(listener, router)
        .await
        .expect("server error");
}
