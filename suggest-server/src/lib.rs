//! # Suggestion Server
//!
//! HTTP surface over the subtask suggestion orchestrator.
//!
//! ## Endpoints
//!
//! - `POST /api/suggest-subtasks` - Body `{title, description?}`, returns `{suggestions}`
//! - `GET /health` - Liveness plus whether a credential is configured
//! - `GET /metrics` - Prometheus metrics endpoint
//!
//! Failures are returned as `{error, code, retry}` with the status chosen
//! from the failure kind.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ErrorResponse, ServerError};
pub use routes::create_router;
pub use server::{SuggestServer, install_metrics, run_from_env, run_server};
pub use state::AppState;
