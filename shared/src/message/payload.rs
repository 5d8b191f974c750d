use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Notification ====================

/// Notification kinds understood by client apps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Booking created / waitlisted
    BookingReceived,
    /// Booking status transition (checked in, cancelled, promoted)
    BookingStatusChanged,
    /// Wallet payout requested / settled
    PayoutUpdate,
    /// Tip share credited
    TipReceived,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BookingReceived => write!(f, "booking_received"),
            Self::BookingStatusChanged => write!(f, "booking_status_changed"),
            Self::PayoutUpdate => write!(f, "payout_update"),
            Self::TipReceived => write!(f, "tip_received"),
        }
    }
}

/// Notification payload (server -> user)
///
/// `message_key` + `message_params` are resolved to localized text by the
/// client; the server never renders message strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub message_key: String,
    #[serde(default)]
    pub message_params: serde_json::Value,
    /// Recipient role ("customer", "merchant", "staff")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Originating module ("bookings", "wallets", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// BCP-47 language hint; `None` lets the client decide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

// ==================== Sync ====================

/// Resource sync payload (server -> all clients)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource type (e.g. "booking", "wallet", "menu_item")
    pub resource: String,
    /// Version number (clients trigger a full refresh when the gap is > 5)
    pub version: u64,
    /// Change kind ("created", "updated", "deleted")
    pub action: String,
    /// Resource ID
    pub id: String,
    /// Resource data (None for "deleted")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
