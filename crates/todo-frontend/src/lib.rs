//! Todo Frontend Library
//!
//! HTTP surface of the todo app frontend: a cached image endpoint, a
//! pass-through to the todo backend, and liveness/readiness probes.

pub mod backend;
pub mod config;
pub mod error;
pub mod readiness;
pub mod routes;
pub mod server;
pub mod types;

pub use backend::{BackendClient, ForwardedResponse};
pub use config::FrontendConfig;
pub use error::{FrontendError, Result};
pub use readiness::{Readiness, ReadinessTracker};
pub use server::{create_router, start_server, ServerState, SharedState};
