//! End-to-end orchestration flows against the real service stack
//!
//! These tests wire the real storage, audit log, notifier, broadcast bus
//! and points ledger (file-backed in a temp dir) and drive the domain
//! operations the way handlers do.

use std::sync::Arc;

use plaza_server::core::{AppState, Config};
use plaza_server::effects::PointsLedger;
use plaza_server::effects::audit::AuditAction;
use plaza_server::effects::points::PointsError;
use plaza_server::ops::actions::{
    CancelBookingAction, CheckInBookingAction, CreateBookingAction, DistributeTipsAction,
    RegisterVenueAction, RequestPayoutAction,
};
use plaza_server::ops::{Execution, OpError, OperationMeta, Orchestrator, SideEffectFanout};
use rust_decimal::Decimal;
use shared::models::{BookingStatus, TipShare, Wallet, WalletKind};
use shared::util::now_millis;

fn test_config(dir: &tempfile::TempDir) -> Config {
    Config {
        work_dir: dir.path().to_string_lossy().to_string(),
        http_port: 0,
        environment: "test".to_string(),
        audit_buffer_size: 64,
        notify_buffer_size: 64,
        notify_webhook_url: None,
        log_level: "warn".to_string(),
    }
}

fn meta_for(operator_id: i64) -> OperationMeta {
    OperationMeta {
        request_id: uuid::Uuid::new_v4().to_string(),
        operator_id,
        operator_name: format!("Operator {operator_id}"),
        operator_role: "staff".to_string(),
        ip_address: None,
        timestamp: now_millis(),
    }
}

/// Initialize the full state; background workers stay unstarted, so
/// notifications simply queue.
fn test_state(dir: &tempfile::TempDir) -> AppState {
    let (state, _channels) = AppState::initialize(&test_config(dir)).unwrap();
    state
}

async fn register_venue(state: &AppState, capacity: u32) -> i64 {
    let action = RegisterVenueAction {
        name: "Corner Bistro".to_string(),
        slot_capacity: capacity,
    };
    match state.orchestrator.run(&action, &meta_for(1)).await.unwrap() {
        Execution::Completed(done) => done.output.venue.id,
        Execution::Duplicate => panic!("unexpected duplicate"),
    }
}

async fn create_booking(state: &AppState, venue_id: i64, customer_id: i64, slot: i64) -> i64 {
    let action = CreateBookingAction {
        venue_id,
        customer_id,
        customer_name: format!("Customer {customer_id}"),
        party_size: 2,
        slot_start: slot,
        notes: None,
    };
    match state.orchestrator.run(&action, &meta_for(1)).await.unwrap() {
        Execution::Completed(done) => done.output.booking.id,
        Execution::Duplicate => panic!("unexpected duplicate"),
    }
}

fn seed_wallet(state: &AppState, id: i64, kind: WalletKind, balance: Decimal) {
    let txn = state.storage.begin_write().unwrap();
    let wallet = Wallet {
        id,
        owner_id: id,
        owner_name: format!("Owner {id}"),
        kind,
        balance,
        currency: "EUR".to_string(),
        created_at: now_millis(),
        updated_at: now_millis(),
    };
    state.storage.put_wallet(&txn, &wallet).unwrap();
    txn.commit().unwrap();
}

#[tokio::test]
async fn check_in_flow_commits_audits_and_awards_points() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let mut bus_rx = state.broadcast.subscribe();

    let venue_id = register_venue(&state, 4).await;
    let booking_id = create_booking(&state, venue_id, 9, 1000).await;

    let operator_id = 77;
    let action = CheckInBookingAction {
        booking_id,
        table_label: Some("T4".to_string()),
    };
    let execution = state
        .orchestrator
        .run(&action, &meta_for(operator_id))
        .await
        .unwrap();

    let Execution::Completed(done) = execution else {
        panic!("expected completed execution");
    };
    assert_eq!(done.output.booking.status, BookingStatus::CheckedIn);
    assert!(done.gamification_error.is_none());

    // The committed write is visible
    let stored = state.storage.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::CheckedIn);

    // Points landed on the operator
    assert_eq!(state.points.balance(operator_id).unwrap(), 25);

    // The audit chain has the check-in entry and verifies
    let (entries, _) = state
        .audit
        .query(&plaza_server::effects::audit::AuditQuery {
            action: Some(AuditAction::BookingCheckedIn),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert!(state.audit.verify_chain(None, None).unwrap().valid);

    // Broadcast subscribers saw the sync messages (venue, booking, update)
    let mut sync_count = 0;
    while bus_rx.try_recv().is_ok() {
        sync_count += 1;
    }
    assert!(sync_count >= 3);
}

/// Points ledger that always fails, for the soft-error path
struct BrokenPoints;

#[async_trait::async_trait]
impl PointsLedger for BrokenPoints {
    async fn award(
        &self,
        _award: shared::models::PointsAward,
    ) -> Result<shared::models::PointsRecord, PointsError> {
        Err(PointsError::Storage("points service offline".to_string()))
    }
}

#[tokio::test]
async fn points_outage_yields_gamification_error_not_failure() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);

    let venue_id = register_venue(&state, 4).await;
    let booking_id = create_booking(&state, venue_id, 9, 1000).await;

    // Same storage and collaborators, but a broken points ledger
    let (notifier, _notify_rx) = plaza_server::effects::notify::ChannelNotifier::new(16);
    let fanout = SideEffectFanout::new(
        state.audit.clone(),
        Arc::new(notifier),
        state.broadcast.clone(),
        Arc::new(BrokenPoints),
    );
    let orchestrator = Orchestrator::new(state.storage.clone(), fanout);

    let action = CheckInBookingAction {
        booking_id,
        table_label: None,
    };
    let execution = orchestrator.run(&action, &meta_for(77)).await.unwrap();

    let Execution::Completed(done) = execution else {
        panic!("expected completed execution");
    };
    // The write stands and the failure is a soft error
    assert_eq!(done.output.booking.status, BookingStatus::CheckedIn);
    assert!(done.gamification_error.is_some());
    let stored = state.storage.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::CheckedIn);
}

#[tokio::test]
async fn payout_exceeding_balance_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    seed_wallet(&state, 5, WalletKind::Merchant, Decimal::new(5_00, 2));

    let action = RequestPayoutAction {
        wallet_id: 5,
        amount: Decimal::new(10_00, 2),
        note: None,
    };
    let err = state
        .orchestrator
        .run(&action, &meta_for(1))
        .await
        .unwrap_err();
    assert!(matches!(err, OpError::InsufficientFunds(_)));

    // Balance untouched, no ledger entry, no audit entry
    let wallet = state.storage.get_wallet(5).unwrap().unwrap();
    assert_eq!(wallet.balance, Decimal::new(5_00, 2));
    assert!(state.storage.get_wallet_entries(5).unwrap().is_empty());
    let (entries, _) = state
        .audit
        .query(&plaza_server::effects::audit::AuditQuery {
            action: Some(AuditAction::PayoutRequested),
            ..Default::default()
        })
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn duplicate_request_id_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let venue_id = register_venue(&state, 4).await;
    let booking_id = create_booking(&state, venue_id, 9, 1000).await;

    let action = CheckInBookingAction {
        booking_id,
        table_label: None,
    };
    let meta = meta_for(77);

    let first = state.orchestrator.run(&action, &meta).await.unwrap();
    assert!(matches!(first, Execution::Completed(_)));

    let second = state.orchestrator.run(&action, &meta).await.unwrap();
    assert!(matches!(second, Execution::Duplicate));

    // Points were awarded exactly once
    assert_eq!(state.points.balance(77).unwrap(), 25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_check_ins_let_exactly_one_win() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let venue_id = register_venue(&state, 4).await;
    let booking_id = create_booking(&state, venue_id, 9, 1000).await;

    let mut handles = Vec::new();
    for operator_id in [100, 200] {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let action = CheckInBookingAction {
                booking_id,
                table_label: None,
            };
            state.orchestrator.run(&action, &meta_for(operator_id)).await
        }));
    }

    let mut successes = 0;
    let mut transitions_rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(Execution::Completed(_)) => successes += 1,
            Ok(Execution::Duplicate) => panic!("distinct request ids cannot be duplicates"),
            Err(OpError::InvalidTransition(_)) => transitions_rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(transitions_rejected, 1);
    let stored = state.storage.get_booking(booking_id).unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::CheckedIn);
}

#[tokio::test]
async fn cancelling_promotes_the_waitlist_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    let venue_id = register_venue(&state, 1).await;

    // Capacity 1: first booking pending, second waitlisted
    let first = create_booking(&state, venue_id, 9, 1000).await;
    let second = create_booking(&state, venue_id, 10, 1000).await;
    assert_eq!(
        state.storage.get_booking(second).unwrap().unwrap().status,
        BookingStatus::Waitlisted
    );

    let action = CancelBookingAction {
        booking_id: first,
        reason: Some("no show".to_string()),
    };
    let execution = state.orchestrator.run(&action, &meta_for(1)).await.unwrap();
    let Execution::Completed(done) = execution else {
        panic!("expected completed execution");
    };
    assert_eq!(done.output.promoted.as_ref().unwrap().id, second);

    // Both writes landed in one unit of work
    assert_eq!(
        state.storage.get_booking(first).unwrap().unwrap().status,
        BookingStatus::Cancelled
    );
    assert_eq!(
        state.storage.get_booking(second).unwrap().unwrap().status,
        BookingStatus::Pending
    );

    // Audit has the cancellation and the promotion
    let (promoted_entries, _) = state
        .audit
        .query(&plaza_server::effects::audit::AuditQuery {
            action: Some(AuditAction::BookingPromoted),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(promoted_entries.len(), 1);
}

#[tokio::test]
async fn tip_distribution_balances_to_the_cent() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);
    seed_wallet(&state, 5, WalletKind::Merchant, Decimal::new(100_00, 2));
    seed_wallet(&state, 11, WalletKind::Staff, Decimal::ZERO);
    seed_wallet(&state, 12, WalletKind::Staff, Decimal::ZERO);
    seed_wallet(&state, 13, WalletKind::Staff, Decimal::ZERO);

    let action = DistributeTipsAction {
        source_wallet_id: 5,
        pool: Decimal::new(10_00, 2),
        shares: vec![
            TipShare { wallet_id: 11, weight: 1 },
            TipShare { wallet_id: 12, weight: 1 },
            TipShare { wallet_id: 13, weight: 1 },
        ],
        note: Some("friday service".to_string()),
    };
    let execution = state.orchestrator.run(&action, &meta_for(1)).await.unwrap();
    assert!(matches!(execution, Execution::Completed(_)));

    let source = state.storage.get_wallet(5).unwrap().unwrap();
    let credited: Decimal = [11, 12, 13]
        .iter()
        .map(|id| state.storage.get_wallet(*id).unwrap().unwrap().balance)
        .sum();

    assert_eq!(source.balance, Decimal::new(90_00, 2));
    assert_eq!(credited, Decimal::new(10_00, 2));

    // Ledger: one debit on the source, one credit per recipient
    assert_eq!(state.storage.get_wallet_entries(5).unwrap().len(), 1);
    for id in [11, 12, 13] {
        assert_eq!(state.storage.get_wallet_entries(id).unwrap().len(), 1);
    }
}
