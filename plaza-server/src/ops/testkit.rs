//! Fake collaborators for orchestrator and fan-out tests
//!
//! Every fake records its invocations into a shared [`CallLog`] in call
//! order, so tests can assert cross-collaborator ordering, and can be
//! switched to fail on demand.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::effects::audit::{AuditError, AuditRecordRequest};
use crate::effects::notify::NotifyError;
use crate::effects::points::PointsError;
use crate::effects::{AuditSink, BroadcastChannel, NotificationGateway, PointsLedger};
use crate::ops::traits::OperationMeta;
use shared::message::NotificationPayload;
use shared::models::{PointsAward, PointsRecord};

/// Shared, ordered record of collaborator invocations
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

pub fn test_meta() -> OperationMeta {
    OperationMeta {
        request_id: uuid::Uuid::new_v4().to_string(),
        operator_id: 1,
        operator_name: "Test Operator".to_string(),
        operator_role: "staff".to_string(),
        ip_address: None,
        timestamp: shared::util::now_millis(),
    }
}

pub struct FakeAudit {
    log: CallLog,
    fail: bool,
}

impl FakeAudit {
    pub fn new(log: CallLog, fail: bool) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl AuditSink for FakeAudit {
    async fn log_action(&self, request: AuditRecordRequest) -> Result<(), AuditError> {
        self.log.push(format!(
            "audit:{}:{}",
            request.resource_type, request.resource_id
        ));
        if self.fail {
            return Err(AuditError::Storage("forced audit failure".to_string()));
        }
        Ok(())
    }
}

pub struct FakeNotifier {
    log: CallLog,
    fail: bool,
}

impl FakeNotifier {
    pub fn new(log: CallLog, fail: bool) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl NotificationGateway for FakeNotifier {
    async fn send(&self, notification: NotificationPayload) -> Result<(), NotifyError> {
        self.log.push(format!("notify:user:{}", notification.user_id));
        if self.fail {
            return Err(NotifyError::WorkerStopped);
        }
        Ok(())
    }
}

pub struct FakeBroadcast {
    log: CallLog,
}

impl FakeBroadcast {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

impl BroadcastChannel for FakeBroadcast {
    fn emit(&self, resource: &str, _action: &str, id: &str, _data: Option<serde_json::Value>) {
        self.log.push(format!("broadcast:{resource}:{id}"));
    }
}

pub struct FakePoints {
    log: CallLog,
    fail: bool,
}

impl FakePoints {
    pub fn new(log: CallLog, fail: bool) -> Self {
        Self { log, fail }
    }
}

#[async_trait]
impl PointsLedger for FakePoints {
    async fn award(&self, award: PointsAward) -> Result<PointsRecord, PointsError> {
        self.log.push(format!("points:user:{}", award.user_id));
        if self.fail {
            return Err(PointsError::Storage("forced points failure".to_string()));
        }
        Ok(PointsRecord {
            id: 1,
            user_id: award.user_id,
            action: award.action,
            points: award.points,
            metadata: award.metadata,
            created_at: shared::util::now_millis(),
        })
    }
}
