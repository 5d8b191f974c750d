//! Venue API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::api::operator::Operator;
use crate::api::run_orchestrated;
use crate::core::AppState;
use crate::ops::actions::{RegisterVenueAction, RegisteredVenue};
use crate::ops::Completed;
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::Venue;

#[derive(Debug, Deserialize)]
pub struct RegisterVenueRequest {
    pub name: String,
    pub slot_capacity: u32,
}

/// POST /api/venues - register a venue
pub async fn register(
    State(state): State<AppState>,
    operator: Operator,
    Json(payload): Json<RegisterVenueRequest>,
) -> AppResult<Json<AppResponse<Completed<RegisteredVenue>>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let action = RegisterVenueAction {
        name: payload.name,
        slot_capacity: payload.slot_capacity,
    };
    run_orchestrated(&state, &action, operator).await
}

/// GET /api/venues - list venues
pub async fn list(State(state): State<AppState>) -> AppResult<Json<AppResponse<Vec<Venue>>>> {
    let venues = state
        .storage
        .list_venues()
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(ok(venues))
}

/// GET /api/venues/:id - venue detail
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Venue>>> {
    let venue = state
        .storage
        .get_venue(id)
        .map_err(|e| AppError::Storage(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Venue {id}")))?;
    Ok(ok(venue))
}
