//! Booking API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::api::operator::Operator;
use crate::api::run_orchestrated;
use crate::core::AppState;
use crate::ops::Completed;
use crate::ops::actions::{
    CancelBookingAction, CancelledBooking, CheckInBookingAction, CheckedInBooking,
    CreateBookingAction, CreatedBooking,
};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::Booking;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub venue_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub party_size: u32,
    pub slot_start: i64,
    pub notes: Option<String>,
}

/// POST /api/bookings - create a booking (waitlisted when the slot is full)
pub async fn create(
    State(state): State<AppState>,
    operator: Operator,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<AppResponse<Completed<CreatedBooking>>>> {
    validate_required_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;

    let action = CreateBookingAction {
        venue_id: payload.venue_id,
        customer_id: payload.customer_id,
        customer_name: payload.customer_name,
        party_size: payload.party_size,
        slot_start: payload.slot_start,
        notes: payload.notes,
    };
    run_orchestrated(&state, &action, operator).await
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    pub table_label: Option<String>,
}

/// POST /api/bookings/:id/check-in
pub async fn check_in(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<CheckInRequest>,
) -> AppResult<Json<AppResponse<Completed<CheckedInBooking>>>> {
    let action = CheckInBookingAction {
        booking_id: id,
        table_label: payload.table_label,
    };
    run_orchestrated(&state, &action, operator).await
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// POST /api/bookings/:id/cancel
pub async fn cancel(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<CancelRequest>,
) -> AppResult<Json<AppResponse<Completed<CancelledBooking>>>> {
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let action = CancelBookingAction {
        booking_id: id,
        reason: payload.reason,
    };
    run_orchestrated(&state, &action, operator).await
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub venue_id: i64,
}

/// GET /api/bookings?venue_id=... - bookings for a venue
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<Booking>>>> {
    let bookings = state
        .storage
        .get_bookings_for_venue(query.venue_id)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(ok(bookings))
}

/// GET /api/bookings/:id - booking detail
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Booking>>> {
    let booking = state
        .storage
        .get_booking(id)
        .map_err(|e| AppError::Storage(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Booking {id}")))?;
    Ok(ok(booking))
}
