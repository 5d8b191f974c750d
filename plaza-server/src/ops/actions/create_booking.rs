//! CreateBooking operation
//!
//! Creates a booking for a venue slot. When the slot is already at the
//! venue's capacity the booking is created `Waitlisted` instead of being
//! rejected; it is promoted to `Pending` when a slot frees up (see
//! `CancelBooking`).

use async_trait::async_trait;
use serde::Serialize;

use crate::effects::audit::{AuditAction, create_snapshot};
use crate::ops::context::OperationContext;
use crate::ops::descriptor::SideEffect;
use crate::ops::error::{OpError, OpResult};
use crate::ops::traits::{Operation, OperationMeta, Outcome};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, MAX_PARTY_SIZE};
use shared::message::NotificationKind;
use shared::models::{Booking, BookingStatus};
use shared::util::snowflake_id;

/// CreateBooking action
#[derive(Debug, Clone)]
pub struct CreateBookingAction {
    pub venue_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub party_size: u32,
    pub slot_start: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedBooking {
    pub booking: Booking,
    pub waitlisted: bool,
}

#[async_trait]
impl Operation for CreateBookingAction {
    type Output = CreatedBooking;

    fn name(&self) -> &'static str {
        "create_booking"
    }

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> OpResult<Outcome<Self::Output>> {
        // 1. Validate inputs
        if self.customer_name.trim().is_empty() {
            return Err(OpError::Validation(
                "customer name must not be empty".to_string(),
            ));
        }
        if self.customer_name.len() > MAX_NAME_LEN {
            return Err(OpError::Validation(format!(
                "customer name is too long (max {MAX_NAME_LEN})"
            )));
        }
        if self.party_size == 0 || self.party_size > MAX_PARTY_SIZE {
            return Err(OpError::Validation(format!(
                "party_size must be between 1 and {MAX_PARTY_SIZE}"
            )));
        }
        if self.slot_start <= 0 {
            return Err(OpError::Validation("slot_start must be set".to_string()));
        }
        if let Some(notes) = &self.notes
            && notes.len() > MAX_NOTE_LEN
        {
            return Err(OpError::Validation(format!(
                "notes are too long (max {MAX_NOTE_LEN})"
            )));
        }

        // 2. Venue must exist and be active
        let venue = ctx.venue(self.venue_id)?;
        if !venue.is_active {
            return Err(OpError::InvalidTransition(format!(
                "Venue {} is not accepting bookings",
                venue.id
            )));
        }

        // 3. Capacity check: count slot-occupying bookings for this slot
        let occupied = ctx
            .bookings_for_venue(self.venue_id)?
            .iter()
            .filter(|b| b.slot_start == self.slot_start && b.occupies_slot())
            .count() as u32;
        let waitlisted = occupied >= venue.slot_capacity;

        // 4. Stage the booking
        let status = if waitlisted {
            BookingStatus::Waitlisted
        } else {
            BookingStatus::Pending
        };
        let booking = Booking {
            id: snowflake_id(),
            venue_id: self.venue_id,
            customer_id: self.customer_id,
            customer_name: self.customer_name.trim().to_string(),
            party_size: self.party_size,
            slot_start: self.slot_start,
            status,
            table_label: None,
            notes: self.notes.clone(),
            created_at: meta.timestamp,
            updated_at: meta.timestamp,
        };
        ctx.stage_booking(booking.clone());

        // 5. Describe side effects
        let (audit_action, message_key) = if waitlisted {
            (AuditAction::BookingWaitlisted, "booking.waitlisted")
        } else {
            (AuditAction::BookingCreated, "booking.received")
        };
        let effects = vec![
            SideEffect::audit(
                audit_action,
                "booking",
                booking.id,
                create_snapshot(&booking, "booking"),
            ),
            SideEffect::notify(
                booking.customer_id,
                NotificationKind::BookingReceived,
                message_key,
                serde_json::json!({
                    "booking_id": booking.id,
                    "venue_name": venue.name,
                    "slot_start": booking.slot_start,
                }),
                "customer",
                "bookings",
            ),
            SideEffect::broadcast(
                "booking",
                "created",
                booking.id,
                Some(serde_json::to_value(&booking).unwrap_or_default()),
            ),
        ];

        Ok(Outcome::new(CreatedBooking { booking, waitlisted }, effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testkit::test_meta;
    use crate::store::MarketStorage;
    use shared::models::Venue;
    use shared::util::now_millis;

    fn seed_venue(storage: &MarketStorage, txn: &redb::WriteTransaction, capacity: u32) -> Venue {
        let venue = Venue {
            id: 10,
            name: "Corner Bistro".to_string(),
            slot_capacity: capacity,
            is_active: true,
            created_at: now_millis(),
            updated_at: now_millis(),
        };
        storage.put_venue(txn, &venue).unwrap();
        venue
    }

    fn action_for_slot(slot_start: i64) -> CreateBookingAction {
        CreateBookingAction {
            venue_id: 10,
            customer_id: 9,
            customer_name: "Ada".to_string(),
            party_size: 2,
            slot_start,
            notes: None,
        }
    }

    #[tokio::test]
    async fn creates_pending_booking_when_capacity_free() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_venue(&storage, &txn, 2);
        let mut ctx = OperationContext::new(&txn, &storage);

        let outcome = action_for_slot(1000)
            .execute(&mut ctx, &test_meta())
            .await
            .unwrap();

        assert!(!outcome.output.waitlisted);
        assert_eq!(outcome.output.booking.status, BookingStatus::Pending);
        assert_eq!(outcome.effects.len(), 3);
    }

    #[tokio::test]
    async fn waitlists_when_slot_at_capacity() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_venue(&storage, &txn, 1);
        let mut ctx = OperationContext::new(&txn, &storage);
        let meta = test_meta();

        // First booking takes the only slot
        let first = action_for_slot(1000).execute(&mut ctx, &meta).await.unwrap();
        assert!(!first.output.waitlisted);

        // Second one lands on the waitlist (staged booking counts too)
        let second = action_for_slot(1000).execute(&mut ctx, &meta).await.unwrap();
        assert!(second.output.waitlisted);
        assert_eq!(second.output.booking.status, BookingStatus::Waitlisted);
    }

    #[tokio::test]
    async fn different_slots_do_not_share_capacity() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_venue(&storage, &txn, 1);
        let mut ctx = OperationContext::new(&txn, &storage);
        let meta = test_meta();

        let first = action_for_slot(1000).execute(&mut ctx, &meta).await.unwrap();
        let second = action_for_slot(2000).execute(&mut ctx, &meta).await.unwrap();

        assert!(!first.output.waitlisted);
        assert!(!second.output.waitlisted);
    }

    #[tokio::test]
    async fn missing_venue_fails_not_found() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = OperationContext::new(&txn, &storage);

        let result = action_for_slot(1000).execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::NotFound(_))));
    }

    #[tokio::test]
    async fn inactive_venue_rejects_bookings() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut venue = seed_venue(&storage, &txn, 2);
        venue.is_active = false;
        storage.put_venue(&txn, &venue).unwrap();
        let mut ctx = OperationContext::new(&txn, &storage);

        let result = action_for_slot(1000).execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn zero_party_size_fails_validation() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_venue(&storage, &txn, 2);
        let mut ctx = OperationContext::new(&txn, &storage);

        let mut action = action_for_slot(1000);
        action.party_size = 0;
        let result = action.execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::Validation(_))));
    }
}
