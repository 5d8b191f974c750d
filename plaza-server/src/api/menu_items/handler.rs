//! Menu Item API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api::operator::Operator;
use crate::api::run_orchestrated;
use crate::core::AppState;
use crate::ops::Completed;
use crate::ops::actions::{
    AmendMenuItemAction, AmendedMenuItem, CreateMenuItemAction, CreatedMenuItem,
};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResponse, AppResult, ok};
use shared::models::{MenuItem, MenuItemAmend};

#[derive(Debug, Deserialize)]
pub struct CreateMenuItemRequest {
    pub venue_id: i64,
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
}

/// POST /api/menu-items - create a menu item
pub async fn create(
    State(state): State<AppState>,
    operator: Operator,
    Json(payload): Json<CreateMenuItemRequest>,
) -> AppResult<Json<AppResponse<Completed<CreatedMenuItem>>>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let action = CreateMenuItemAction {
        venue_id: payload.venue_id,
        name: payload.name,
        price: payload.price,
        category: payload.category,
    };
    run_orchestrated(&state, &action, operator).await
}

/// PUT /api/menu-items/:id - amend a menu item
pub async fn amend(
    State(state): State<AppState>,
    operator: Operator,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemAmend>,
) -> AppResult<Json<AppResponse<Completed<AmendedMenuItem>>>> {
    let action = AmendMenuItemAction {
        item_id: id,
        amend: payload,
    };
    run_orchestrated(&state, &action, operator).await
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub venue_id: i64,
}

/// GET /api/menu-items?venue_id=... - menu for a venue
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<MenuItem>>>> {
    let items = state
        .storage
        .get_menu_for_venue(query.venue_id)
        .map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(ok(items))
}

/// GET /api/menu-items/:id - menu item detail
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<MenuItem>>> {
    let item = state
        .storage
        .get_menu_item(id)
        .map_err(|e| AppError::Storage(e.to_string()))?
        .ok_or_else(|| AppError::not_found(format!("Menu item {id}")))?;
    Ok(ok(item))
}
