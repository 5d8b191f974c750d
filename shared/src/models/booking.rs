//! Booking Model

use serde::{Deserialize, Serialize};

/// Booking lifecycle status
///
/// Legal transitions:
/// - `Pending -> CheckedIn -> Completed`
/// - `Pending | Waitlisted -> Cancelled`
/// - `Waitlisted -> Pending` (promotion when a slot frees up)
/// - `Pending -> NoShow`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Waitlisted,
    CheckedIn,
    Completed,
    Cancelled,
    NoShow,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Waitlisted => "waitlisted",
            Self::CheckedIn => "checked_in",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        };
        write!(f, "{s}")
    }
}

/// Booking entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub venue_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub party_size: u32,
    /// Slot start, Unix millis
    pub slot_start: i64,
    pub status: BookingStatus,
    pub table_label: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Booking {
    /// Statuses that count against a venue slot's capacity
    pub fn occupies_slot(&self) -> bool {
        matches!(
            self.status,
            BookingStatus::Pending | BookingStatus::CheckedIn
        )
    }
}

/// Create booking payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreate {
    pub venue_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub party_size: u32,
    pub slot_start: i64,
    pub notes: Option<String>,
}
