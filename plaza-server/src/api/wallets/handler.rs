//! Wallet API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::operator::Operator;
use crate::api::run_orchestrated;
use crate::core::AppState;
use crate::ops::Completed;
use crate::ops::actions::{
    DistributeTipsAction, PayoutResult, RequestPayoutAction, TipsResult,
};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::{TipShare, Wallet, WalletEntry};

/// GET /api/wallets/:id - wallet detail
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Wallet>>> {
    let wallet = state
        .storage
        .get_wallet(id)
        .map_err(|e| AppError::Storage(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Wallet {id}")))?;
    Ok(ok(wallet))
}

/// GET /api/wallets/:id/entries - ledger entries, oldest first
pub async fn entries(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Vec<WalletEntry>>>> {
    let entries = state
        .storage
        .get_wallet_entries(id)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(ok(entries))
}

#[derive(Debug, Deserialize)]
pub struct PayoutRequest {
    pub amount: Decimal,
    pub note: Option<String>,
}

/// POST /api/wallets/:id/payouts - request a merchant payout
pub async fn request_payout(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<PayoutRequest>,
) -> AppResult<Json<AppResponse<Completed<PayoutResult>>>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let action = RequestPayoutAction {
        wallet_id: id,
        amount: payload.amount,
        note: payload.note,
    };
    run_orchestrated(&state, &action, operator).await
}

#[derive(Debug, Deserialize)]
pub struct TipsRequest {
    pub pool: Decimal,
    pub shares: Vec<TipShare>,
    pub note: Option<String>,
}

/// POST /api/wallets/:id/tips - distribute a tip pool to staff wallets
pub async fn distribute_tips(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<TipsRequest>,
) -> AppResult<Json<AppResponse<Completed<TipsResult>>>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let action = DistributeTipsAction {
        source_wallet_id: id,
        pool: payload.pool,
        shares: payload.shares,
        note: payload.note,
    };
    run_orchestrated(&state, &action, operator).await
}
