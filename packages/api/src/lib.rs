//! Wire-level response bodies for tessel.
//!
//! Shared by the `tessel` core (which renders dispatch failures with
//! [`ErrorResponse`]) and the `tessel-server` HTTP binding (which also serves
//! the [`ServiceInfo`] discovery document).
//!
//! | Type | Used for |
//! |------|----------|
//! | [`ErrorResponse`] | every 4xx/5xx body |
//! | [`ServiceInfo`] | `GET /.well-known/tessel` |

pub mod error;
pub mod service;

pub use error::{codes, ErrorResponse};
pub use service::{ResourceInfo, ServiceInfo};
