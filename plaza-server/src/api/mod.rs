//! API routing
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`venues`] - venue registry
//! - [`bookings`] - booking lifecycle (create / check-in / cancel)
//! - [`wallets`] - balances, payouts, tip distribution
//! - [`menu_items`] - menu catalog
//! - [`points`] - gamification point balances
//! - [`audit`] - audit log queries and chain verification
//! - [`sync`] - realtime sync WebSocket
//!
//! Write handlers validate their payload, build a domain operation, and
//! hand it to [`run_orchestrated`]; they contain no transaction, audit,
//! broadcast, or points code.

pub mod operator;

pub mod audit;
pub mod bookings;
pub mod health;
pub mod menu_items;
pub mod points;
pub mod sync;
pub mod venues;
pub mod wallets;

use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::AppState;
use crate::ops::{Completed, Execution, Operation};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};
use operator::Operator;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(venues::router())
        .merge(bookings::router())
        .merge(wallets::router())
        .merge(menu_items::router())
        .merge(points::router())
        .merge(audit::router())
        .merge(sync::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run one domain operation through the orchestrator and wrap the result in
/// the response envelope
///
/// Every write handler resolves to exactly one envelope: the operation's
/// output (with fan-out warnings attached) on success, a `duplicate
/// request` marker for a replayed idempotency key, or the mapped error.
pub(crate) async fn run_orchestrated<O: Operation>(
    state: &AppState,
    action: &O,
    operator: Operator,
) -> AppResult<Json<AppResponse<Completed<O::Output>>>> {
    let meta = operator.into_meta();
    match state
        .orchestrator
        .run(action, &meta)
        .await
        .map_err(AppError::from)?
    {
        Execution::Completed(done) => Ok(ok(done)),
        Execution::Duplicate => Ok(ok_with_message(None, "duplicate request")),
    }
}
