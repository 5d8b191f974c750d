//! Audit logging
//!
//! Append-only, hash-chained audit log. Entries are immutable and
//! undeletable; a SHA256 chain links every entry to its predecessor so
//! tampering is detectable via [`AuditStorage::verify_chain`].
//!
//! Two write paths:
//! - fan-out writes go through [`AuditService::log_sync`] and must succeed
//!   for the request to succeed
//! - lifecycle events (startup/shutdown) go through an mpsc channel drained
//!   by [`AuditWorker`]

pub mod diff;
mod service;
mod storage;
mod types;
mod worker;

pub use diff::{create_diff, create_snapshot};
pub use service::{AuditLogRequest, AuditService};
pub use storage::{AuditStorage, AuditStorageError};
pub use types::{
    AuditAction, AuditChainVerification, AuditEntry, AuditQuery, AuditRecordRequest,
};
pub use worker::AuditWorker;

/// Audit collaborator error surfaced to the orchestrator
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit storage failure: {0}")]
    Storage(String),

    #[error("audit channel closed")]
    ChannelClosed,
}

impl From<AuditStorageError> for AuditError {
    fn from(err: AuditStorageError) -> Self {
        AuditError::Storage(err.to_string())
    }
}
