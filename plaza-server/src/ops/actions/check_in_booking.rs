//! CheckInBooking operation
//!
//! Marks a pending booking as checked in. Awards gamification points to the
//! staff operator performing the check-in; the award is best-effort and a
//! failure surfaces as `gamification_error` on the response.

use async_trait::async_trait;
use serde::Serialize;

use crate::effects::audit::AuditAction;
use crate::ops::context::OperationContext;
use crate::ops::descriptor::SideEffect;
use crate::ops::error::{OpError, OpResult};
use crate::ops::traits::{Operation, OperationMeta, Outcome};
use crate::utils::validation::MAX_SHORT_TEXT_LEN;
use shared::message::NotificationKind;
use shared::models::{Booking, BookingStatus};

/// Points awarded to the operator for a completed check-in
const CHECK_IN_POINTS: i64 = 25;

/// CheckInBooking action
#[derive(Debug, Clone)]
pub struct CheckInBookingAction {
    pub booking_id: i64,
    pub table_label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckedInBooking {
    pub booking: Booking,
}

#[async_trait]
impl Operation for CheckInBookingAction {
    type Output = CheckedInBooking;

    fn name(&self) -> &'static str {
        "check_in_booking"
    }

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> OpResult<Outcome<Self::Output>> {
        // 1. Validate inputs
        if let Some(label) = &self.table_label
            && label.len() > MAX_SHORT_TEXT_LEN
        {
            return Err(OpError::Validation(format!(
                "table_label is too long (max {MAX_SHORT_TEXT_LEN})"
            )));
        }

        // 2. Load booking and check the state machine
        let mut booking = ctx.booking(self.booking_id)?;
        match booking.status {
            BookingStatus::Pending => {}
            BookingStatus::CheckedIn => {
                return Err(OpError::InvalidTransition(format!(
                    "Booking {} is already checked in",
                    booking.id
                )));
            }
            BookingStatus::Waitlisted => {
                return Err(OpError::InvalidTransition(format!(
                    "Booking {} is waitlisted and must be promoted first",
                    booking.id
                )));
            }
            BookingStatus::Cancelled => {
                return Err(OpError::InvalidTransition(format!(
                    "Booking {} is cancelled",
                    booking.id
                )));
            }
            status => {
                return Err(OpError::InvalidTransition(format!(
                    "Cannot check in booking {} with status {status}",
                    booking.id
                )));
            }
        }

        // 3. Apply the transition
        let previous = booking.status;
        booking.status = BookingStatus::CheckedIn;
        if self.table_label.is_some() {
            booking.table_label = self.table_label.clone();
        }
        booking.updated_at = meta.timestamp;
        ctx.stage_booking(booking.clone());

        // 4. Describe side effects
        let effects = vec![
            SideEffect::audit(
                AuditAction::BookingCheckedIn,
                "booking",
                booking.id,
                serde_json::json!({
                    "from": previous.to_string(),
                    "to": booking.status.to_string(),
                    "table_label": booking.table_label,
                }),
            ),
            SideEffect::notify(
                booking.customer_id,
                NotificationKind::BookingStatusChanged,
                "booking.checked_in",
                serde_json::json!({
                    "booking_id": booking.id,
                    "table_label": booking.table_label,
                }),
                "customer",
                "bookings",
            ),
            SideEffect::broadcast(
                "booking",
                "updated",
                booking.id,
                Some(serde_json::to_value(&booking).unwrap_or_default()),
            ),
            SideEffect::award_points(
                meta.operator_id,
                "booking_check_in",
                CHECK_IN_POINTS,
                serde_json::json!({"booking_id": booking.id}),
            ),
        ];

        Ok(Outcome::new(CheckedInBooking { booking }, effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::EffectKind;
    use crate::ops::testkit::test_meta;
    use crate::store::MarketStorage;
    use shared::util::now_millis;

    fn seed_booking(
        storage: &MarketStorage,
        txn: &redb::WriteTransaction,
        id: i64,
        status: BookingStatus,
    ) -> Booking {
        let booking = Booking {
            id,
            venue_id: 10,
            customer_id: 9,
            customer_name: "Ada".to_string(),
            party_size: 2,
            slot_start: now_millis(),
            status,
            table_label: None,
            notes: None,
            created_at: now_millis(),
            updated_at: now_millis(),
        };
        storage.put_booking(txn, &booking).unwrap();
        booking
    }

    #[tokio::test]
    async fn pending_booking_checks_in() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_booking(&storage, &txn, 42, BookingStatus::Pending);
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = CheckInBookingAction {
            booking_id: 42,
            table_label: Some("T4".to_string()),
        };
        let outcome = action.execute(&mut ctx, &test_meta()).await.unwrap();

        assert_eq!(outcome.output.booking.status, BookingStatus::CheckedIn);
        assert_eq!(outcome.output.booking.table_label.as_deref(), Some("T4"));

        // All four effect kinds: audit, notify customer, broadcast, points
        let kinds: Vec<EffectKind> = outcome.effects.iter().map(|e| e.kind()).collect();
        assert!(kinds.contains(&EffectKind::Audit));
        assert!(kinds.contains(&EffectKind::Notify));
        assert!(kinds.contains(&EffectKind::Broadcast));
        assert!(kinds.contains(&EffectKind::Points));
    }

    #[tokio::test]
    async fn points_go_to_the_operator() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_booking(&storage, &txn, 42, BookingStatus::Pending);
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = CheckInBookingAction {
            booking_id: 42,
            table_label: None,
        };
        let meta = test_meta();
        let outcome = action.execute(&mut ctx, &meta).await.unwrap();

        let award = outcome
            .effects
            .iter()
            .find_map(|e| match e {
                SideEffect::AwardPoints(a) => Some(a),
                _ => None,
            })
            .expect("expected a points descriptor");
        assert_eq!(award.user_id, meta.operator_id);
        assert_eq!(award.points, CHECK_IN_POINTS);
    }

    #[tokio::test]
    async fn already_checked_in_fails() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_booking(&storage, &txn, 42, BookingStatus::CheckedIn);
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = CheckInBookingAction {
            booking_id: 42,
            table_label: None,
        };
        let result = action.execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn waitlisted_booking_cannot_check_in() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_booking(&storage, &txn, 42, BookingStatus::Waitlisted);
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = CheckInBookingAction {
            booking_id: 42,
            table_label: None,
        };
        let result = action.execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn missing_booking_fails_not_found() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = CheckInBookingAction {
            booking_id: 404,
            table_label: None,
        };
        let result = action.execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::NotFound(_))));
    }
}
