//! API module
//!
//! Contains HTTP request handlers for the survey endpoints and the router
//! that wires them together.

pub mod export;
pub mod health;
pub mod responses;

use crate::state::SharedState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

/// Build the API router with every survey route and the request body cap
pub fn router(state: SharedState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/submit", post(responses::submit_response))
        .route(
            "/api/responses",
            get(responses::list_responses).delete(responses::clear_responses),
        )
        .route("/api/export.csv", get(export::export_csv))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}
