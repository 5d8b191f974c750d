//! CreateMenuItem operation

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::effects::audit::{AuditAction, create_snapshot};
use crate::ops::context::OperationContext;
use crate::ops::descriptor::SideEffect;
use crate::ops::error::{OpError, OpResult};
use crate::ops::traits::{Operation, OperationMeta, Outcome};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN};
use shared::models::MenuItem;
use shared::util::snowflake_id;

/// CreateMenuItem action
#[derive(Debug, Clone)]
pub struct CreateMenuItemAction {
    pub venue_id: i64,
    pub name: String,
    pub price: Decimal,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedMenuItem {
    pub item: MenuItem,
}

#[async_trait]
impl Operation for CreateMenuItemAction {
    type Output = CreatedMenuItem;

    fn name(&self) -> &'static str {
        "create_menu_item"
    }

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> OpResult<Outcome<Self::Output>> {
        // 1. Validate inputs
        if self.name.trim().is_empty() {
            return Err(OpError::Validation("item name must not be empty".to_string()));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(OpError::Validation(format!(
                "item name is too long (max {MAX_NAME_LEN})"
            )));
        }
        if self.price < Decimal::ZERO || self.price.scale() > 2 {
            return Err(OpError::Validation(
                "price must be non-negative with at most two decimal places".to_string(),
            ));
        }
        if let Some(category) = &self.category
            && category.len() > MAX_SHORT_TEXT_LEN
        {
            return Err(OpError::Validation(format!(
                "category is too long (max {MAX_SHORT_TEXT_LEN})"
            )));
        }

        // 2. Venue must exist
        let venue = ctx.venue(self.venue_id)?;
        if !venue.is_active {
            return Err(OpError::InvalidTransition(format!(
                "Venue {} is not active",
                venue.id
            )));
        }

        // 3. Stage the item
        let item = MenuItem {
            id: snowflake_id(),
            venue_id: self.venue_id,
            name: self.name.trim().to_string(),
            price: self.price,
            category: self.category.clone(),
            is_available: true,
            created_at: meta.timestamp,
            updated_at: meta.timestamp,
        };
        ctx.stage_menu_item(item.clone());

        // 4. Describe side effects
        let effects = vec![
            SideEffect::audit(
                AuditAction::MenuItemCreated,
                "menu_item",
                item.id,
                create_snapshot(&item, "menu_item"),
            ),
            SideEffect::broadcast(
                "menu_item",
                "created",
                item.id,
                Some(serde_json::to_value(&item).unwrap_or_default()),
            ),
        ];

        Ok(Outcome::new(CreatedMenuItem { item }, effects))
    }
}
