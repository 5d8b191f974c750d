//! Menu Item API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

/// Menu item router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/menu-items", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id).put(handler::amend))
}
