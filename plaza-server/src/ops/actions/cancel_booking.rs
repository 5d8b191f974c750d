//! CancelBooking operation
//!
//! Cancels a pending or waitlisted booking. When a slot-occupying booking
//! is cancelled and the slot has waitlisted bookings, the oldest one is
//! promoted to `Pending` inside the same unit of work, so the slot never
//! appears free between the two writes.

use async_trait::async_trait;
use serde::Serialize;

use crate::effects::audit::AuditAction;
use crate::ops::context::OperationContext;
use crate::ops::descriptor::SideEffect;
use crate::ops::error::{OpError, OpResult};
use crate::ops::traits::{Operation, OperationMeta, Outcome};
use crate::utils::validation::MAX_NOTE_LEN;
use shared::message::NotificationKind;
use shared::models::{Booking, BookingStatus};

/// CancelBooking action
#[derive(Debug, Clone)]
pub struct CancelBookingAction {
    pub booking_id: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelledBooking {
    pub booking: Booking,
    /// Waitlisted booking promoted into the freed slot, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted: Option<Booking>,
}

#[async_trait]
impl Operation for CancelBookingAction {
    type Output = CancelledBooking;

    fn name(&self) -> &'static str {
        "cancel_booking"
    }

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> OpResult<Outcome<Self::Output>> {
        // 1. Validate inputs
        if let Some(reason) = &self.reason
            && reason.len() > MAX_NOTE_LEN
        {
            return Err(OpError::Validation(format!(
                "reason is too long (max {MAX_NOTE_LEN})"
            )));
        }

        // 2. Load booking and check the state machine
        let mut booking = ctx.booking(self.booking_id)?;
        let frees_slot = match booking.status {
            BookingStatus::Pending => true,
            BookingStatus::Waitlisted => false,
            BookingStatus::Cancelled => {
                return Err(OpError::InvalidTransition(format!(
                    "Booking {} is already cancelled",
                    booking.id
                )));
            }
            status => {
                return Err(OpError::InvalidTransition(format!(
                    "Cannot cancel booking {} with status {status}",
                    booking.id
                )));
            }
        };

        // 3. Apply the cancellation
        let previous = booking.status;
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = meta.timestamp;
        ctx.stage_booking(booking.clone());

        let mut effects = vec![
            SideEffect::audit(
                AuditAction::BookingCancelled,
                "booking",
                booking.id,
                serde_json::json!({
                    "from": previous.to_string(),
                    "to": booking.status.to_string(),
                    "reason": self.reason,
                }),
            ),
            SideEffect::notify(
                booking.customer_id,
                NotificationKind::BookingStatusChanged,
                "booking.cancelled",
                serde_json::json!({
                    "booking_id": booking.id,
                    "reason": self.reason,
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
        ];

        // 4. Promote the oldest waitlisted booking into the freed slot
        let mut promoted = None;
        if frees_slot {
            let waitlist: Vec<Booking> = ctx
                .bookings_for_venue(booking.venue_id)?
                .into_iter()
                .filter(|b| {
                    b.status == BookingStatus::Waitlisted && b.slot_start == booking.slot_start
                })
                .collect();

            // Oldest first; snowflake IDs break created_at ties in arrival order
            if let Some(next) = waitlist
                .into_iter()
                .min_by_key(|b| (b.created_at, b.id))
            {
                let mut next = next;
                next.status = BookingStatus::Pending;
                next.updated_at = meta.timestamp;
                ctx.stage_booking(next.clone());

                effects.push(SideEffect::audit(
                    AuditAction::BookingPromoted,
                    "booking",
                    next.id,
                    serde_json::json!({
                        "from": BookingStatus::Waitlisted.to_string(),
                        "to": next.status.to_string(),
                        "freed_by": booking.id,
                    }),
                ));
                effects.push(SideEffect::notify(
                    next.customer_id,
                    NotificationKind::BookingStatusChanged,
                    "booking.promoted",
                    serde_json::json!({
                        "booking_id": next.id,
                        "slot_start": next.slot_start,
                    }),
                    "customer",
                    "bookings",
                ));
                effects.push(SideEffect::broadcast(
                    "booking",
                    "updated",
                    next.id,
                    Some(serde_json::to_value(&next).unwrap_or_default()),
                ));
                promoted = Some(next);
            }
        }

        Ok(Outcome::new(CancelledBooking { booking, promoted }, effects))
    }
}
