//! Points API Module
//!
//! Read-only: all awards happen through the side-effect fan-out.

mod handler;

use axum::{Router, routing::get};

use crate::core::AppState;

/// Points router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/points", routes())
}

fn routes() -> Router<AppState> {
    Router::new().route("/users/{id}", get(handler::get_user_points))
}
