//! Public surface for the `tessel-server` crate.
//!
//! Exposes the application builder, the router and config types so that
//! tests and embedding crates can serve tessel resources in-process.

pub mod config;
pub mod demo;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod storage;

pub use config::ServerConfig;
pub use error::{AppError, SetupError};
pub use router::build_router;
pub use routes::{App, AppBuilder, RouteTable};
pub use storage::{memory::MemoryStorage, Storage};
