//! Side-effect collaborators
//!
//! The four external collaborators every write operation can fan out to:
//! audit log, notification gateway, realtime broadcast, gamification points.
//!
//! Each collaborator is consumed through a trait object so the fan-out can
//! be constructed with fakes in tests instead of module-level singletons.
//! Real implementations live alongside the traits:
//!
//! - [`audit`] - append-only hash-chained audit log (redb)
//! - [`notify`] - queued notification delivery with optional webhook
//! - [`broadcast`] - resource-versioned sync bus
//! - [`points`] - gamification points ledger (redb)

pub mod audit;
pub mod broadcast;
pub mod notify;
pub mod points;

use async_trait::async_trait;

use audit::{AuditError, AuditRecordRequest};
use notify::NotifyError;
use points::PointsError;
use shared::message::NotificationPayload;
use shared::models::{PointsAward, PointsRecord};

/// Compliance audit log. Failure is fatal to the request.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_action(&self, request: AuditRecordRequest) -> Result<(), AuditError>;
}

/// User notification delivery. Failure is logged and swallowed.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send(&self, notification: NotificationPayload) -> Result<(), NotifyError>;
}

/// Realtime resource sync. Fire-and-forget.
pub trait BroadcastChannel: Send + Sync {
    fn emit(&self, resource: &str, action: &str, id: &str, data: Option<serde_json::Value>);
}

/// Gamification points. Failure is captured and surfaced as a warning.
#[async_trait]
pub trait PointsLedger: Send + Sync {
    async fn award(&self, award: PointsAward) -> Result<PointsRecord, PointsError>;
}
