//! Audit log service
//!
//! `AuditService` is the audit log front door:
//! - synchronous writes for fan-out descriptors (failure must fail the
//!   request, so these bypass the channel)
//! - channel-buffered writes for lifecycle events (startup/shutdown)
//! - queries and chain verification (read the storage directly)

use std::sync::Arc;
use tokio::sync::mpsc;

use super::storage::{AuditStorage, AuditStorageError};
use super::types::*;
use crate::effects::AuditSink;

/// Log request sent to the background worker
pub struct AuditLogRequest {
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub details: serde_json::Value,
}

/// Audit log service
///
/// Holds the append-only storage plus an mpsc sender for non-critical
/// lifecycle events. Fan-out writes never go through the channel: the
/// orchestrator needs the write acknowledged (or failed) before it can
/// answer the caller.
pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl std::fmt::Debug for AuditService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditService").finish_non_exhaustive()
    }
}

impl AuditService {
    /// Create the audit service and the receiver for its background worker
    pub fn new(
        storage: AuditStorage,
        buffer_size: usize,
    ) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        let service = Arc::new(Self { storage, tx });
        (service, rx)
    }

    /// Record a lifecycle event (non-blocking, via the worker channel)
    ///
    /// If the channel is full this waits; audit entries must not be dropped.
    pub async fn log_lifecycle(
        &self,
        action: AuditAction,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        details: serde_json::Value,
    ) {
        let req = AuditLogRequest {
            action,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            details,
        };

        if self.tx.send(req).await.is_err() {
            tracing::error!("Audit log channel closed, audit entry lost!");
        }
    }

    /// Write an audit entry synchronously
    pub fn log_sync(&self, request: AuditRecordRequest) -> Result<AuditEntry, AuditStorageError> {
        self.storage.append(
            request.action,
            request.resource_type,
            request.resource_id,
            request.operator_id,
            request.operator_name,
            request.operator_role,
            request.ip_address,
            request.details,
        )
    }

    /// Query audit entries
    pub fn query(&self, q: &AuditQuery) -> Result<(Vec<AuditEntry>, u64), AuditStorageError> {
        self.storage.query(q)
    }

    /// Verify audit chain integrity
    pub fn verify_chain(
        &self,
        from: Option<u64>,
        to: Option<u64>,
    ) -> Result<AuditChainVerification, AuditStorageError> {
        self.storage.verify_chain(from, to)
    }

    /// Storage handle for the background worker
    pub fn storage(&self) -> &AuditStorage {
        &self.storage
    }
}

#[async_trait::async_trait]
impl AuditSink for AuditService {
    async fn log_action(&self, request: AuditRecordRequest) -> Result<(), super::AuditError> {
        self.log_sync(request)?;
        Ok(())
    }
}
