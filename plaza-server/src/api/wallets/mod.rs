//! Wallet API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

/// Wallet router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/wallets", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/entries", get(handler::entries))
        .route("/{id}/payouts", post(handler::request_payout))
        .route("/{id}/tips", post(handler::distribute_tips))
}
