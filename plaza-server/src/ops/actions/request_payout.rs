//! RequestPayout operation
//!
//! Debits a merchant wallet and appends the matching ledger entry. The
//! balance check and the debit share one unit of work, so a concurrent
//! payout can never overdraw the wallet.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::effects::audit::AuditAction;
use crate::ops::context::OperationContext;
use crate::ops::descriptor::SideEffect;
use crate::ops::error::{OpError, OpResult};
use crate::ops::traits::{Operation, OperationMeta, Outcome};
use crate::utils::validation::MAX_NOTE_LEN;
use shared::message::NotificationKind;
use shared::models::{Wallet, WalletEntry, WalletEntryKind, WalletKind};
use shared::util::snowflake_id;

/// RequestPayout action
#[derive(Debug, Clone)]
pub struct RequestPayoutAction {
    pub wallet_id: i64,
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PayoutResult {
    pub wallet: Wallet,
    pub entry: WalletEntry,
}

#[async_trait]
impl Operation for RequestPayoutAction {
    type Output = PayoutResult;

    fn name(&self) -> &'static str {
        "request_payout"
    }

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> OpResult<Outcome<Self::Output>> {
        // 1. Validate inputs
        if self.amount <= Decimal::ZERO {
            return Err(OpError::Validation("amount must be positive".to_string()));
        }
        if self.amount.scale() > 2 {
            return Err(OpError::Validation(
                "amount must have at most two decimal places".to_string(),
            ));
        }
        if let Some(note) = &self.note
            && note.len() > MAX_NOTE_LEN
        {
            return Err(OpError::Validation(format!(
                "note is too long (max {MAX_NOTE_LEN})"
            )));
        }

        // 2. Load wallet; only merchant wallets can request payouts
        let mut wallet = ctx.wallet(self.wallet_id)?;
        if wallet.kind != WalletKind::Merchant {
            return Err(OpError::Validation(format!(
                "Wallet {} is not a merchant wallet",
                wallet.id
            )));
        }

        // 3. Balance check and debit in the same unit of work
        if wallet.balance < self.amount {
            return Err(OpError::InsufficientFunds(format!(
                "balance {} {}, requested {}",
                wallet.balance, wallet.currency, self.amount
            )));
        }
        wallet.balance -= self.amount;
        wallet.updated_at = meta.timestamp;
        ctx.stage_wallet(wallet.clone());

        let entry = WalletEntry {
            id: snowflake_id(),
            wallet_id: wallet.id,
            kind: WalletEntryKind::PayoutRequested,
            amount: -self.amount,
            note: self.note.clone(),
            created_at: meta.timestamp,
        };
        ctx.stage_wallet_entry(entry.clone());

        // 4. Describe side effects
        let effects = vec![
            SideEffect::audit(
                AuditAction::PayoutRequested,
                "wallet",
                wallet.id,
                serde_json::json!({
                    "amount": self.amount,
                    "currency": wallet.currency,
                    "balance_after": wallet.balance,
                    "entry_id": entry.id,
                }),
            ),
            SideEffect::notify(
                wallet.owner_id,
                NotificationKind::PayoutUpdate,
                "wallet.payout_requested",
                serde_json::json!({
                    "wallet_id": wallet.id,
                    "amount": self.amount,
                    "currency": wallet.currency,
                }),
                "merchant",
                "wallets",
            ),
            SideEffect::broadcast(
                "wallet",
                "updated",
                wallet.id,
                Some(serde_json::to_value(&wallet).unwrap_or_default()),
            ),
        ];

        Ok(Outcome::new(PayoutResult { wallet, entry }, effects))
    }
}
