//! AmendMenuItem operation
//!
//! Applies partial updates to a menu item. The audit entry carries a
//! field-level diff of the change, not a full snapshot.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::effects::audit::{AuditAction, create_diff};
use crate::ops::context::OperationContext;
use crate::ops::descriptor::SideEffect;
use crate::ops::error::{OpError, OpResult};
use crate::ops::traits::{Operation, OperationMeta, Outcome};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN};
use shared::models::{MenuItem, MenuItemAmend};

/// AmendMenuItem action
#[derive(Debug, Clone)]
pub struct AmendMenuItemAction {
    pub item_id: i64,
    pub amend: MenuItemAmend,
}

#[derive(Debug, Serialize)]
pub struct AmendedMenuItem {
    pub item: MenuItem,
}

#[async_trait]
impl Operation for AmendMenuItemAction {
    type Output = AmendedMenuItem;

    fn name(&self) -> &'static str {
        "amend_menu_item"
    }

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> OpResult<Outcome<Self::Output>> {
        // 1. Validate inputs
        let amend = &self.amend;
        if amend.name.is_none()
            && amend.price.is_none()
            && amend.category.is_none()
            && amend.is_available.is_none()
        {
            return Err(OpError::Validation("no changes supplied".to_string()));
        }
        if let Some(name) = &amend.name {
            if name.trim().is_empty() {
                return Err(OpError::Validation("item name must not be empty".to_string()));
            }
            if name.len() > MAX_NAME_LEN {
                return Err(OpError::Validation(format!(
                    "item name is too long (max {MAX_NAME_LEN})"
                )));
            }
        }
        if let Some(price) = amend.price
            && (price < Decimal::ZERO || price.scale() > 2)
        {
            return Err(OpError::Validation(
                "price must be non-negative with at most two decimal places".to_string(),
            ));
        }
        if let Some(category) = &amend.category
            && category.len() > MAX_SHORT_TEXT_LEN
        {
            return Err(OpError::Validation(format!(
                "category is too long (max {MAX_SHORT_TEXT_LEN})"
            )));
        }

        // 2. Load and apply
        let old = ctx.menu_item(self.item_id)?;
        let mut item = old.clone();
        if let Some(name) = &amend.name {
            item.name = name.trim().to_string();
        }
        if let Some(price) = amend.price {
            item.price = price;
        }
        if let Some(category) = &amend.category {
            item.category = Some(category.clone());
        }
        if let Some(is_available) = amend.is_available {
            item.is_available = is_available;
        }
        item.updated_at = meta.timestamp;
        ctx.stage_menu_item(item.clone());

        // 3. Describe side effects (audit carries the field diff)
        let effects = vec![
            SideEffect::audit(
                AuditAction::MenuItemAmended,
                "menu_item",
                item.id,
                create_diff(&old, &item, "menu_item"),
            ),
            SideEffect::broadcast(
                "menu_item",
                "updated",
                item.id,
                Some(serde_json::to_value(&item).unwrap_or_default()),
            ),
        ];

        Ok(Outcome::new(AmendedMenuItem { item }, effects))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::testkit::test_meta;
    use crate::store::MarketStorage;
    use shared::util::now_millis;

    fn seed_item(storage: &MarketStorage, txn: &redb::WriteTransaction) -> MenuItem {
        let item = MenuItem {
            id: 3,
            venue_id: 10,
            name: "Espresso".to_string(),
            price: Decimal::new(2_50, 2),
            category: Some("drinks".to_string()),
            is_available: true,
            created_at: now_millis(),
            updated_at: now_millis(),
        };
        storage.put_menu_item(txn, &item).unwrap();
        item
    }

    #[tokio::test]
    async fn amend_changes_price_and_availability() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_item(&storage, &txn);
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = AmendMenuItemAction {
            item_id: 3,
            amend: MenuItemAmend {
                price: Some(Decimal::new(2_80, 2)),
                is_available: Some(false),
                ..MenuItemAmend::default()
            },
        };
        let outcome = action.execute(&mut ctx, &test_meta()).await.unwrap();

        assert_eq!(outcome.output.item.price, Decimal::new(2_80, 2));
        assert!(!outcome.output.item.is_available);
        // Name untouched
        assert_eq!(outcome.output.item.name, "Espresso");
    }

    #[tokio::test]
    async fn audit_effect_carries_field_diff() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_item(&storage, &txn);
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = AmendMenuItemAction {
            item_id: 3,
            amend: MenuItemAmend {
                price: Some(Decimal::new(3_00, 2)),
                ..MenuItemAmend::default()
            },
        };
        let outcome = action.execute(&mut ctx, &test_meta()).await.unwrap();

        let details = outcome
            .effects
            .iter()
            .find_map(|e| match e {
                SideEffect::Audit { details, .. } => Some(details),
                _ => None,
            })
            .expect("expected an audit descriptor");
        let changes = details["changes"].as_array().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0]["field"], "price");
    }

    #[tokio::test]
    async fn empty_amend_fails_validation() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        seed_item(&storage, &txn);
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = AmendMenuItemAction {
            item_id: 3,
            amend: MenuItemAmend::default(),
        };
        let result = action.execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_item_fails_not_found() {
        let storage = MarketStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let mut ctx = OperationContext::new(&txn, &storage);

        let action = AmendMenuItemAction {
            item_id: 404,
            amend: MenuItemAmend {
                is_available: Some(false),
                ..MenuItemAmend::default()
            },
        };
        let result = action.execute(&mut ctx, &test_meta()).await;
        assert!(matches!(result, Err(OpError::NotFound(_))));
    }
}
