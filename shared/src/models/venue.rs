//! Venue Model

use serde::{Deserialize, Serialize};

/// Venue entity (restaurant, lot, event space)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    /// Maximum concurrent non-terminal bookings per slot
    pub slot_capacity: u32,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create venue payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueCreate {
    pub name: String,
    pub slot_capacity: u32,
}
