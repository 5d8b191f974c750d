//! Audit API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::AppState;
use crate::effects::audit::{AuditChainVerification, AuditEntry, AuditQuery};
use crate::utils::{AppError, AppResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct AuditPage {
    pub entries: Vec<AuditEntry>,
    pub total: u64,
}

/// GET /api/audit - query audit entries (newest first)
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<Json<AppResponse<AuditPage>>> {
    let (entries, total) = state
        .audit
        .query(&params)
        .map_err(|e| AppError::Audit(e.to_string()))?;
    Ok(ok(AuditPage { entries, total }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub from: Option<u64>,
    pub to: Option<u64>,
}

/// GET /api/audit/verify - verify hash chain integrity
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> AppResult<Json<AppResponse<AuditChainVerification>>> {
    let verification = state
        .audit
        .verify_chain(params.from, params.to)
        .map_err(|e| AppError::Audit(e.to_string()))?;
    Ok(ok(verification))
}
