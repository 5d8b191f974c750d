//! Venue API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

/// Venue router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/venues", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::register).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
}
