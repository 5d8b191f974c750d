//! RegisterVenue operation
//!
//! Creates a venue with a per-slot booking capacity. New venues start
//! active.

use async_trait::async_trait;
use serde::Serialize;

use crate::effects::audit::{AuditAction, create_snapshot};
use crate::ops::context::OperationContext;
use crate::ops::descriptor::SideEffect;
use crate::ops::error::{OpError, OpResult};
use crate::ops::traits::{Operation, OperationMeta, Outcome};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SLOT_CAPACITY};
use shared::models::Venue;
use shared::util::snowflake_id;

/// RegisterVenue action
#[derive(Debug, Clone)]
pub struct RegisterVenueAction {
    pub name: String,
    pub slot_capacity: u32,
}

#[derive(Debug, Serialize)]
pub struct RegisteredVenue {
    pub venue: Venue,
}

#[async_trait]
impl Operation for RegisterVenueAction {
    type Output = RegisteredVenue;

    fn name(&self) -> &'static str {
        "register_venue"
    }

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> OpResult<Outcome<Self::Output>> {
        // 1. Validate inputs
        if self.name.trim().is_empty() {
            return Err(OpError::Validation("venue name must not be empty".to_string()));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(OpError::Validation(format!(
                "venue name is too long (max {MAX_NAME_LEN})"
            )));
        }
        if self.slot_capacity == 0 || self.slot_capacity > MAX_SLOT_CAPACITY {
            return Err(OpError::Validation(format!(
                "slot_capacity must be between 1 and {MAX_SLOT_CAPACITY}"
            )));
        }

        // 2. Stage the new venue
        let venue = Venue {
            id: snowflake_id(),
            name: self.name.trim().to_string(),
            slot_capacity: self.slot_capacity,
            is_active: true,
            created_at: meta.timestamp,
            updated_at: meta.timestamp,
        };
        ctx.stage_venue(venue.clone());

        // 3. Describe side effects
        let effects = vec![
            SideEffect::audit(
                AuditAction::VenueRegistered,
                "venue",
                venue.id,
                create_snapshot(&venue, "venue"),
            ),
            SideEffect::broadcast(
                "venue",
                "created",
                venue.id,
                Some(serde_json::to_value(&venue).unwrap_or_default()),
            ),
        ];

        Ok(Outcome::new(RegisteredVenue { venue }, effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::EffectKind;
    use crate::ops::testkit::test_meta;
    use crate::store::MarketStorage;

    #[tokio::test]
    async fn register_venue_stages_active_venue() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = RegisterVenueAction {
            name: "  Corner Bistro ".to_string(),
            slot_capacity: 12,
        };
        let outcome = action.execute(&mut ctx, &test_meta()).await.unwrap();

        assert_eq!(outcome.output.venue.name, "Corner Bistro");
        assert!(outcome.output.venue.is_active);
        assert_eq!(outcome.effects.len(), 2);
        assert_eq!(outcome.effects[0].kind(), EffectKind::Audit);
        assert_eq!(outcome.effects[1].kind(), EffectKind::Broadcast);
    }

    #[tokio::test]
    async fn register_venue_empty_name_fails() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = RegisterVenueAction {
            name: "   ".to_string(),
            slot_capacity: 4,
        };
        let result = action.execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::Validation(_))));
    }

    #[tokio::test]
    async fn register_venue_zero_capacity_fails() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = RegisterVenueAction {
            name: "Lot B".to_string(),
            slot_capacity: 0,
        };
        let result = action.execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::Validation(_))));
    }
}
