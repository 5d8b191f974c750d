//! Audit log type definitions
//!
//! Core data structures of the compliance-grade audit log.
//! All entries are immutable and undeletable; a SHA256 hash chain makes
//! tampering detectable.

use serde::{Deserialize, Serialize};

/// Audit action types (enum, not free text)
///
/// Grouped by domain so every sensitive operation has a fixed identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ System lifecycle ═══
    /// Normal startup
    SystemStartup,
    /// Normal shutdown
    SystemShutdown,

    // ═══ Venues ═══
    /// Venue registered
    VenueRegistered,

    // ═══ Bookings ═══
    /// Booking created (pending)
    BookingCreated,
    /// Booking created onto the waitlist (slot at capacity)
    BookingWaitlisted,
    /// Booking checked in
    BookingCheckedIn,
    /// Booking cancelled
    BookingCancelled,
    /// Waitlisted booking promoted to pending
    BookingPromoted,

    // ═══ Wallets (financially critical) ═══
    /// Merchant payout requested
    PayoutRequested,
    /// Tip pool distributed to staff wallets
    TipsDistributed,

    // ═══ Menus ═══
    /// Menu item created
    MenuItemCreated,
    /// Menu item amended (price/name/availability)
    MenuItemAmended,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Fan-out audit request (one per descriptor)
#[derive(Debug, Clone)]
pub struct AuditRecordRequest {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub operator_id: Option<i64>,
    pub operator_name: Option<String>,
    pub operator_role: Option<String>,
    pub ip_address: Option<String>,
    pub details: serde_json::Value,
}

/// Audit log entry (immutable)
///
/// Every record carries a SHA256 hash chain:
/// - `prev_hash`: hash of the previous record ("genesis" for the first)
/// - `curr_hash`: hash of this record (prev_hash + all fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Globally increasing sequence number (unique identifier)
    pub id: u64,
    /// Unix millis
    pub timestamp: i64,
    pub action: AuditAction,
    /// Resource type ("booking", "wallet", "system", ...)
    pub resource_type: String,
    /// Resource ID
    pub resource_id: String,
    /// Operator user ID (None for system events)
    pub operator_id: Option<i64>,
    pub operator_name: Option<String>,
    pub operator_role: Option<String>,
    pub ip_address: Option<String>,
    /// Structured details (JSON)
    pub details: serde_json::Value,
    pub prev_hash: String,
    pub curr_hash: String,
}

/// Audit log query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    /// Lower timestamp bound (inclusive, Unix millis)
    pub from: Option<i64>,
    /// Upper timestamp bound (inclusive, Unix millis)
    pub to: Option<i64>,
    pub action: Option<AuditAction>,
    pub operator_id: Option<i64>,
    pub resource_type: Option<String>,
    /// Max entries to return (newest first); default 100
    pub limit: Option<u64>,
}

/// Result of a hash chain verification pass
#[derive(Debug, Clone, Serialize)]
pub struct AuditChainVerification {
    pub valid: bool,
    /// Number of entries checked
    pub checked: u64,
    /// Sequence number of the first broken link, if any
    pub broken_at: Option<u64>,
}
