//! Orchestrator - binds unit of work, domain operation, and fan-out
//!
//! # Call Flow
//!
//! ```text
//! run(operation, meta)
//!     ├─ 1. Idempotency check (request_id)
//!     ├─ 2. Begin write transaction (unit of work)
//!     ├─ 3. Re-check idempotency within the transaction
//!     ├─ 4. Execute domain operation (staged writes)
//!     ├─ 5. Persist staged writes, mark request processed
//!     ├─ 6. Commit transaction
//!     ├─ 7. Apply side-effect fan-out
//!     └─ 8. Return response with fan-out warnings attached
//! ```
//!
//! # Commit-before-fan-out
//!
//! The domain write commits before any side effect runs. A fan-out failure
//! can therefore never make a committed write disappear: notification,
//! broadcast and points failures downgrade to warnings on a success
//! response, and an audit failure fails the request while the write stands
//! (the one deliberate exception, kept from the observed behavior of the
//! system this replaces).
//!
//! Errors raised before commit drop the transaction, which rolls back every
//! staged write; no side effect has run at that point.

use serde::Serialize;

use super::context::OperationContext;
use super::error::OpResult;
use super::fanout::SideEffectFanout;
use super::traits::{Operation, OperationMeta};
use crate::store::{MarketStorage, StorageError};

/// Per-call lifecycle, for tracing
///
/// `Committed`/`FanningOut` never transition back to `RolledBack`: once
/// committed, the write stands regardless of fan-out outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Idle,
    InProgress,
    Committed,
    FanningOut,
    Done,
    RolledBack,
    Failed,
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::InProgress => "in_progress",
            Self::Committed => "committed",
            Self::FanningOut => "fanning_out",
            Self::Done => "done",
            Self::RolledBack => "rolled_back",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Successful orchestrated response payload
///
/// The operation's output is flattened into the envelope's `data`, with the
/// fan-out's non-fatal failures attached alongside it.
#[derive(Debug, Serialize)]
pub struct Completed<T: Serialize> {
    #[serde(flatten)]
    pub output: T,
    /// Points award failure (soft error, write succeeded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gamification_error: Option<String>,
    /// Other non-fatal fan-out failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Result of one orchestrated call
#[derive(Debug)]
pub enum Execution<T: Serialize> {
    Completed(Completed<T>),
    /// The request_id was already processed; no writes, no side effects
    Duplicate,
}

/// Binds one domain operation and its fan-out into a single call
#[derive(Clone)]
pub struct Orchestrator {
    storage: MarketStorage,
    fanout: SideEffectFanout,
}

impl Orchestrator {
    pub fn new(storage: MarketStorage, fanout: SideEffectFanout) -> Self {
        Self { storage, fanout }
    }

    /// Storage handle (read paths, tests)
    pub fn storage(&self) -> &MarketStorage {
        &self.storage
    }

    /// Run one operation inside its own unit of work
    pub async fn run<O: Operation>(
        &self,
        operation: &O,
        meta: &OperationMeta,
    ) -> OpResult<Execution<O::Output>> {
        let op = operation.name();
        let request_id = meta.request_id.as_str();
        let mut state = CallState::Idle;
        tracing::debug!(op, request_id, state = %state, "Orchestrated call started");

        // 1. Idempotency pre-check (cheap, outside the write transaction)
        if self.storage.is_request_processed(request_id)? {
            tracing::warn!(op, request_id, "Duplicate request");
            return Ok(Execution::Duplicate);
        }

        // 2. Begin the unit of work. redb serializes writers, so two
        //    concurrent operations on the same entity order strictly here.
        let txn = self.storage.begin_write()?;
        state = CallState::InProgress;
        tracing::trace!(op, request_id, state = %state, "Unit of work opened");

        // 3. Re-check idempotency now that we hold the write transaction
        if self.storage.is_request_processed_txn(&txn, request_id)? {
            tracing::warn!(op, request_id, "Duplicate request (lost race)");
            return Ok(Execution::Duplicate);
        }

        // 4. Execute the domain operation
        let mut ctx = OperationContext::new(&txn, &self.storage);
        let outcome = match operation.execute(&mut ctx, meta).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Dropping the transaction rolls back every staged write
                state = CallState::RolledBack;
                tracing::debug!(op, request_id, state = %state, error = %e, "Operation failed");
                drop(ctx);
                drop(txn);
                state = CallState::Failed;
                tracing::trace!(op, request_id, state = %state, "Call finished");
                return Err(e);
            }
        };

        // 5. Persist staged writes and mark the request processed
        let staged = ctx.finish();
        for venue in &staged.venues {
            self.storage.put_venue(&txn, venue)?;
        }
        for booking in &staged.bookings {
            self.storage.put_booking(&txn, booking)?;
        }
        for wallet in &staged.wallets {
            self.storage.put_wallet(&txn, wallet)?;
        }
        for item in &staged.menu_items {
            self.storage.put_menu_item(&txn, item)?;
        }
        for entry in &staged.wallet_entries {
            self.storage.append_wallet_entry(&txn, entry)?;
        }
        self.storage.mark_request_processed(&txn, request_id)?;

        // 6. Commit: the domain mutation is now durable
        txn.commit().map_err(StorageError::from)?;
        state = CallState::Committed;
        tracing::debug!(op, request_id, state = %state, "Unit of work committed");

        // 7. Fan-out (best-effort, except audit which escalates)
        state = CallState::FanningOut;
        tracing::trace!(op, request_id, state = %state, effects = outcome.effects.len(), "Applying side effects");
        let report = self.fanout.apply(outcome.effects, meta).await?;

        state = CallState::Done;
        tracing::debug!(
            op,
            request_id,
            state = %state,
            warnings = report.warnings.len(),
            "Orchestrated call finished"
        );

        Ok(Execution::Completed(Completed {
            output: outcome.output,
            gamification_error: report.gamification_error,
            warnings: report.warnings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::audit::AuditAction;
    use crate::ops::descriptor::SideEffect;
    use crate::ops::error::OpError;
    use crate::ops::testkit::{
        CallLog, FakeAudit, FakeBroadcast, FakeNotifier, FakePoints, test_meta,
    };
    use crate::ops::traits::Outcome;
    use async_trait::async_trait;
    use shared::message::NotificationKind;
    use shared::models::{Booking, BookingStatus};
    use shared::util::now_millis;
    use std::sync::Arc;

    fn test_booking(id: i64) -> Booking {
        Booking {
            id,
            venue_id: 10,
            customer_id: 9,
            customer_name: "Ada".to_string(),
            party_size: 2,
            slot_start: now_millis(),
            status: BookingStatus::Pending,
            table_label: None,
            notes: None,
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    #[derive(Debug, serde::Serialize)]
    struct StagedBookingOutput {
        booking: Booking,
    }

    /// Stages one booking and emits all four effect kinds (out of order)
    struct StageBookingOp {
        booking: Booking,
    }

    #[async_trait]
    impl Operation for StageBookingOp {
        type Output = StagedBookingOutput;

        fn name(&self) -> &'static str {
            "stage_booking"
        }

        async fn execute(
            &self,
            ctx: &mut OperationContext<'_>,
            meta: &OperationMeta,
        ) -> OpResult<Outcome<Self::Output>> {
            ctx.stage_booking(self.booking.clone());
            let effects = vec![
                SideEffect::award_points(
                    meta.operator_id,
                    "booking_check_in",
                    25,
                    serde_json::json!({"booking_id": self.booking.id}),
                ),
                SideEffect::broadcast("booking", "updated", self.booking.id, None),
                SideEffect::notify(
                    self.booking.customer_id,
                    NotificationKind::BookingStatusChanged,
                    "booking.updated",
                    serde_json::json!({}),
                    "customer",
                    "bookings",
                ),
                SideEffect::audit(
                    AuditAction::BookingCheckedIn,
                    "booking",
                    self.booking.id,
                    serde_json::json!({}),
                ),
            ];
            Ok(Outcome::new(
                StagedBookingOutput {
                    booking: self.booking.clone(),
                },
                effects,
            ))
        }
    }

    /// Stages a booking, then fails; the staged write must not survive
    struct StageThenFailOp {
        booking: Booking,
    }

    #[async_trait]
    impl Operation for StageThenFailOp {
        type Output = StagedBookingOutput;

        fn name(&self) -> &'static str {
            "stage_then_fail"
        }

        async fn execute(
            &self,
            ctx: &mut OperationContext<'_>,
            _meta: &OperationMeta,
        ) -> OpResult<Outcome<Self::Output>> {
            ctx.stage_booking(self.booking.clone());
            Err(OpError::InvalidTransition(
                "booking is not in a state that permits this".to_string(),
            ))
        }
    }

    fn orchestrator_with(
        log: &CallLog,
        fail_audit: bool,
        fail_points: bool,
    ) -> Orchestrator {
        let storage = crate::store::MarketStorage::open_in_memory().unwrap();
        let fanout = SideEffectFanout::new(
            Arc::new(FakeAudit::new(log.clone(), fail_audit)),
            Arc::new(FakeNotifier::new(log.clone(), false)),
            Arc::new(FakeBroadcast::new(log.clone())),
            Arc::new(FakePoints::new(log.clone(), fail_points)),
        );
        Orchestrator::new(storage, fanout)
    }

    #[tokio::test]
    async fn success_commits_then_fans_out_in_order() {
        let log = CallLog::default();
        let orchestrator = orchestrator_with(&log, false, false);

        let op = StageBookingOp {
            booking: test_booking(42),
        };
        let execution = orchestrator.run(&op, &test_meta()).await.unwrap();

        let Execution::Completed(completed) = execution else {
            panic!("Expected completed execution");
        };
        assert_eq!(completed.output.booking.id, 42);
        assert!(completed.warnings.is_empty());
        assert!(completed.gamification_error.is_none());

        // Write is visible after the call
        let stored = orchestrator.storage().get_booking(42).unwrap().unwrap();
        assert_eq!(stored.customer_name, "Ada");

        // Fan-out ran in kind order
        assert_eq!(
            log.entries(),
            vec![
                "audit:booking:42",
                "notify:user:9",
                "broadcast:booking:42",
                "points:user:1",
            ]
        );
    }

    #[tokio::test]
    async fn operation_failure_rolls_back_everything() {
        let log = CallLog::default();
        let orchestrator = orchestrator_with(&log, false, false);

        let op = StageThenFailOp {
            booking: test_booking(7),
        };
        let err = orchestrator.run(&op, &test_meta()).await.unwrap_err();

        assert!(matches!(err, OpError::InvalidTransition(_)));
        // Rollback is total: no mutation visible, no side effect ran
        assert!(orchestrator.storage().get_booking(7).unwrap().is_none());
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn duplicate_request_skips_writes_and_fanout() {
        let log = CallLog::default();
        let orchestrator = orchestrator_with(&log, false, false);

        let op = StageBookingOp {
            booking: test_booking(42),
        };
        let meta = test_meta();

        let first = orchestrator.run(&op, &meta).await.unwrap();
        assert!(matches!(first, Execution::Completed(_)));
        let calls_after_first = log.entries().len();

        let second = orchestrator.run(&op, &meta).await.unwrap();
        assert!(matches!(second, Execution::Duplicate));
        // No replayed side effects
        assert_eq!(log.entries().len(), calls_after_first);
    }

    #[tokio::test]
    async fn audit_failure_fails_request_but_write_stands() {
        let log = CallLog::default();
        let orchestrator = orchestrator_with(&log, true, false);

        let op = StageBookingOp {
            booking: test_booking(42),
        };
        let err = orchestrator.run(&op, &test_meta()).await.unwrap_err();

        assert!(matches!(err, OpError::Audit(_)));
        // Commit-before-fan-out: the booking is still there
        assert!(orchestrator.storage().get_booking(42).unwrap().is_some());
    }

    #[tokio::test]
    async fn points_failure_surfaces_as_gamification_error() {
        let log = CallLog::default();
        let orchestrator = orchestrator_with(&log, false, true);

        let op = StageBookingOp {
            booking: test_booking(42),
        };
        let execution = orchestrator.run(&op, &test_meta()).await.unwrap();

        let Execution::Completed(completed) = execution else {
            panic!("Expected completed execution");
        };
        assert!(completed.gamification_error.is_some());
        // Write stands, notify + broadcast ran
        assert!(orchestrator.storage().get_booking(42).unwrap().is_some());
        assert!(log.entries().iter().any(|e| e.starts_with("notify:")));
        assert!(log.entries().iter().any(|e| e.starts_with("broadcast:")));
    }
}
