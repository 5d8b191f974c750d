//! Booking API Module
//!
//! All booking mutations run through the orchestrator; reads go straight
//! to storage.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

/// Booking router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/bookings", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/check-in", post(handler::check_in))
        .route("/{id}/cancel", post(handler::cancel))
}
