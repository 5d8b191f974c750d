//! Gamification Points Model

use serde::{Deserialize, Serialize};

/// One points award record (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsRecord {
    pub id: i64,
    pub user_id: i64,
    /// Qualifying action, e.g. "booking_check_in"
    pub action: String,
    pub points: i64,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: i64,
}

/// Award request handed to the points ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsAward {
    pub user_id: i64,
    pub action: String,
    pub points: i64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}
