//! Points API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::core::AppState;
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::PointsRecord;

#[derive(Debug, Serialize)]
pub struct UserPoints {
    pub user_id: i64,
    pub balance: i64,
    pub records: Vec<PointsRecord>,
}

/// GET /api/points/users/:id - balance and award history
pub async fn get_user_points(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<UserPoints>>> {
    let balance = state
        .points
        .balance(id)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let records = state
        .points
        .records(id)
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(ok(UserPoints {
        user_id: id,
        balance,
        records,
    }))
}
