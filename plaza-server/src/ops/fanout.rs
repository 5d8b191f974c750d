//! Side-effect fan-out
//!
//! Executes the descriptors a domain operation produced, after the unit of
//! work committed. Descriptors run in [`EffectKind`] order regardless of
//! the order the operation emitted them:
//!
//! 1. audit - fatal on failure (compliance logging is required)
//! 2. notify - failure logged, surfaced as a warning
//! 3. broadcast - fire-and-forget
//! 4. points - failure captured as `gamification_error`
//!
//! Descriptors are independent: one failing never blocks the others, and
//! nothing here can roll back the committed write.

use std::sync::Arc;

use super::descriptor::{EffectKind, EffectOutcome, SideEffect};
use super::error::OpError;
use super::traits::OperationMeta;
use crate::effects::audit::AuditRecordRequest;
use crate::effects::{AuditSink, BroadcastChannel, NotificationGateway, PointsLedger};

/// What happened to each descriptor, plus the non-fatal failure summary
/// attached to the response.
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub outcomes: Vec<EffectOutcome>,
    /// Human-readable non-fatal failures (notification delivery, ...)
    pub warnings: Vec<String>,
    /// Points award failure, surfaced as a soft error in the response
    pub gamification_error: Option<String>,
}

/// Executes side-effect descriptors against the injected collaborators
#[derive(Clone)]
pub struct SideEffectFanout {
    audit: Arc<dyn AuditSink>,
    notify: Arc<dyn NotificationGateway>,
    broadcast: Arc<dyn BroadcastChannel>,
    points: Arc<dyn PointsLedger>,
}

impl SideEffectFanout {
    pub fn new(
        audit: Arc<dyn AuditSink>,
        notify: Arc<dyn NotificationGateway>,
        broadcast: Arc<dyn BroadcastChannel>,
        points: Arc<dyn PointsLedger>,
    ) -> Self {
        Self {
            audit,
            notify,
            broadcast,
            points,
        }
    }

    /// Apply all descriptors in kind order
    ///
    /// Returns `Err` only for audit failures; every other failure is
    /// reported through the [`FanOutReport`].
    pub async fn apply(
        &self,
        mut effects: Vec<SideEffect>,
        meta: &OperationMeta,
    ) -> Result<FanOutReport, OpError> {
        // Stable sort keeps emission order within a kind
        effects.sort_by_key(|e| e.kind());

        let mut report = FanOutReport::default();

        for effect in effects {
            let kind = effect.kind();
            let target = effect.target();

            match effect {
                SideEffect::Audit {
                    action,
                    resource_type,
                    resource_id,
                    details,
                } => {
                    let request = AuditRecordRequest {
                        action,
                        resource_type,
                        resource_id,
                        operator_id: Some(meta.operator_id),
                        operator_name: Some(meta.operator_name.clone()),
                        operator_role: Some(meta.operator_role.clone()),
                        ip_address: meta.ip_address.clone(),
                        details,
                    };
                    if let Err(e) = self.audit.log_action(request).await {
                        tracing::error!(target = %target, error = %e, "Audit fan-out failed");
                        return Err(OpError::Audit(e.to_string()));
                    }
                    report.outcomes.push(EffectOutcome {
                        kind,
                        target,
                        applied: true,
                        error: None,
                    });
                }

                SideEffect::Notify(payload) => match self.notify.send(payload).await {
                    Ok(()) => report.outcomes.push(EffectOutcome {
                        kind,
                        target,
                        applied: true,
                        error: None,
                    }),
                    Err(e) => {
                        tracing::warn!(target = %target, error = %e, "Notification fan-out failed");
                        report
                            .warnings
                            .push(format!("notification to {target} failed: {e}"));
                        report.outcomes.push(EffectOutcome {
                            kind,
                            target,
                            applied: false,
                            error: Some(e.to_string()),
                        });
                    }
                },

                SideEffect::Broadcast {
                    resource,
                    action,
                    id,
                    data,
                } => {
                    self.broadcast.emit(&resource, &action, &id, data);
                    report.outcomes.push(EffectOutcome {
                        kind,
                        target,
                        applied: true,
                        error: None,
                    });
                }

                SideEffect::AwardPoints(award) => match self.points.award(award).await {
                    Ok(record) => {
                        tracing::debug!(
                            user_id = record.user_id,
                            points = record.points,
                            "Points awarded via fan-out"
                        );
                        report.outcomes.push(EffectOutcome {
                            kind,
                            target,
                            applied: true,
                            error: None,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(target = %target, error = %e, "Points fan-out failed");
                        report.gamification_error = Some(e.to_string());
                        report.outcomes.push(EffectOutcome {
                            kind,
                            target,
                            applied: false,
                            error: Some(e.to_string()),
                        });
                    }
                },
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::audit::AuditAction;
    use crate::ops::testkit::{CallLog, FakeAudit, FakeBroadcast, FakeNotifier, FakePoints, test_meta};
    use shared::message::NotificationKind;

    fn fanout_with(log: &CallLog, fail_audit: bool, fail_points: bool) -> SideEffectFanout {
        SideEffectFanout::new(
            Arc::new(FakeAudit::new(log.clone(), fail_audit)),
            Arc::new(FakeNotifier::new(log.clone(), false)),
            Arc::new(FakeBroadcast::new(log.clone())),
            Arc::new(FakePoints::new(log.clone(), fail_points)),
        )
    }

    fn all_four_effects() -> Vec<SideEffect> {
        // Deliberately emitted out of order
        vec![
            SideEffect::award_points(7, "check_in", 25, serde_json::json!({})),
            SideEffect::broadcast("booking", "updated", 42, None),
            SideEffect::notify(
                9,
                NotificationKind::BookingStatusChanged,
                "booking.checked_in",
                serde_json::json!({}),
                "customer",
                "bookings",
            ),
            SideEffect::audit(
                AuditAction::BookingCheckedIn,
                "booking",
                42,
                serde_json::json!({}),
            ),
        ]
    }

    #[tokio::test]
    async fn applies_in_kind_order() {
        let log = CallLog::default();
        let fanout = fanout_with(&log, false, false);

        let report = fanout.apply(all_four_effects(), &test_meta()).await.unwrap();

        assert_eq!(
            log.entries(),
            vec![
                "audit:booking:42",
                "notify:user:9",
                "broadcast:booking:42",
                "points:user:7",
            ]
        );
        assert!(report.warnings.is_empty());
        assert!(report.gamification_error.is_none());
        assert_eq!(report.outcomes.len(), 4);
    }

    #[tokio::test]
    async fn points_failure_is_isolated() {
        let log = CallLog::default();
        let fanout = fanout_with(&log, false, true);

        let report = fanout.apply(all_four_effects(), &test_meta()).await.unwrap();

        // Notify and broadcast still ran
        assert!(log.entries().iter().any(|e| e.starts_with("notify:")));
        assert!(log.entries().iter().any(|e| e.starts_with("broadcast:")));
        assert!(report.gamification_error.is_some());
    }

    #[tokio::test]
    async fn audit_failure_escalates() {
        let log = CallLog::default();
        let fanout = fanout_with(&log, true, false);

        let err = fanout
            .apply(all_four_effects(), &test_meta())
            .await
            .unwrap_err();
        assert!(matches!(err, OpError::Audit(_)));
        // Nothing after the audit descriptor ran
        assert!(log.entries().iter().all(|e| !e.starts_with("notify:")));
    }

    #[tokio::test]
    async fn notify_failure_becomes_warning() {
        let log = CallLog::default();
        let fanout = SideEffectFanout::new(
            Arc::new(FakeAudit::new(log.clone(), false)),
            Arc::new(FakeNotifier::new(log.clone(), true)),
            Arc::new(FakeBroadcast::new(log.clone())),
            Arc::new(FakePoints::new(log.clone(), false)),
        );

        let report = fanout.apply(all_four_effects(), &test_meta()).await.unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("notification"));
        // Broadcast and points still ran
        assert!(log.entries().iter().any(|e| e.starts_with("broadcast:")));
        assert!(log.entries().iter().any(|e| e.starts_with("points:")));
    }
}
