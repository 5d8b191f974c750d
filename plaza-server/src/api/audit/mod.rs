//! Audit API Module
//!
//! Read-only access to the audit log. Writes only happen through the
//! side-effect fan-out and system lifecycle events.

mod handler;

use axum::{Router, routing::get};

use crate::core::AppState;

/// Audit router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/audit", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::query))
        .route("/verify", get(handler::verify))
}
