//! Spotter API crate - axum HTTP server, route handlers, SSE streaming.
//!
//! Exposes the recording session to the overlay page: context loading,
//! recording control, capture event ingress, tooltip hover, a live event
//! stream, and the `/get_definitions` definition service endpoint.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
