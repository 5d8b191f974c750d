//! Menu Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub venue_id: i64,
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
    pub is_available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub venue_id: i64,
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
}

/// Amend menu item payload (all fields optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemAmend {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub is_available: Option<bool>,
}
