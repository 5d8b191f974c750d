//! DistributeTips operation
//!
//! Debits a merchant tip pool and credits staff wallets by integer weight.
//! Shares are allocated with the largest-remainder method: the credited
//! cents always sum exactly to the pool debit, and no cent is created or
//! lost to rounding.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::effects::audit::AuditAction;
use crate::ops::context::OperationContext;
use crate::ops::descriptor::SideEffect;
use crate::ops::error::{OpError, OpResult};
use crate::ops::traits::{Operation, OperationMeta, Outcome};
use crate::utils::validation::MAX_NOTE_LEN;
use shared::message::NotificationKind;
use shared::models::{TipShare, Wallet, WalletEntry, WalletEntryKind, WalletKind};
use shared::util::snowflake_id;

/// DistributeTips action
#[derive(Debug, Clone)]
pub struct DistributeTipsAction {
    pub source_wallet_id: i64,
    pub pool: Decimal,
    pub shares: Vec<TipShare>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AllocatedShare {
    pub wallet_id: i64,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TipsResult {
    pub source_wallet: Wallet,
    pub shares: Vec<AllocatedShare>,
}

/// Largest-remainder allocation of `pool` over integer weights
///
/// Each share gets its proportional amount truncated to cents; leftover
/// cents go to the largest fractional remainders (ties broken by position).
/// The returned amounts sum exactly to `pool`.
fn allocate_pool(pool: Decimal, shares: &[TipShare]) -> Vec<Decimal> {
    let cent = Decimal::new(1, 2);
    let total_weight: u64 = shares.iter().map(|s| u64::from(s.weight)).sum();
    let total = Decimal::from(total_weight);

    let mut floors = Vec::with_capacity(shares.len());
    let mut fractions = Vec::with_capacity(shares.len());
    for share in shares {
        let raw = pool * Decimal::from(share.weight) / total;
        let floor = raw.trunc_with_scale(2);
        fractions.push(raw - floor);
        floors.push(floor);
    }

    let assigned: Decimal = floors.iter().sum();
    let remainder_cents = ((pool - assigned) / cent)
        .normalize()
        .to_i64()
        .unwrap_or(0);

    // Indices ordered by fractional remainder, largest first, stable
    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|a, b| fractions[*b].cmp(&fractions[*a]));

    for idx in order.into_iter().take(remainder_cents.max(0) as usize) {
        floors[idx] += cent;
    }
    floors
}

#[async_trait]
impl Operation for DistributeTipsAction {
    type Output = TipsResult;

    fn name(&self) -> &'static str {
        "distribute_tips"
    }

    async fn execute(
        &self,
        ctx: &mut OperationContext<'_>,
        meta: &OperationMeta,
    ) -> OpResult<Outcome<Self::Output>> {
        // 1. Validate inputs
        if self.pool <= Decimal::ZERO {
            return Err(OpError::Validation("pool must be positive".to_string()));
        }
        if self.pool.scale() > 2 {
            return Err(OpError::Validation(
                "pool must have at most two decimal places".to_string(),
            ));
        }
        if self.shares.is_empty() {
            return Err(OpError::Validation(
                "at least one share is required".to_string(),
            ));
        }
        if self.shares.iter().any(|s| s.weight == 0) {
            return Err(OpError::Validation("weights must be positive".to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for share in &self.shares {
            if share.wallet_id == self.source_wallet_id {
                return Err(OpError::Validation(
                    "source wallet cannot receive a share".to_string(),
                ));
            }
            if !seen.insert(share.wallet_id) {
                return Err(OpError::Validation(format!(
                    "duplicate share wallet {}",
                    share.wallet_id
                )));
            }
        }
        if let Some(note) = &self.note
            && note.len() > MAX_NOTE_LEN
        {
            return Err(OpError::Validation(format!(
                "note is too long (max {MAX_NOTE_LEN})"
            )));
        }

        // 2. Debit the merchant pool
        let mut source = ctx.wallet(self.source_wallet_id)?;
        if source.kind != WalletKind::Merchant {
            return Err(OpError::Validation(format!(
                "Wallet {} is not a merchant wallet",
                source.id
            )));
        }
        if source.balance < self.pool {
            return Err(OpError::InsufficientFunds(format!(
                "balance {} {}, tip pool {}",
                source.balance, source.currency, self.pool
            )));
        }
        source.balance -= self.pool;
        source.updated_at = meta.timestamp;
        ctx.stage_wallet(source.clone());
        ctx.stage_wallet_entry(WalletEntry {
            id: snowflake_id(),
            wallet_id: source.id,
            kind: WalletEntryKind::TipPoolDebit,
            amount: -self.pool,
            note: self.note.clone(),
            created_at: meta.timestamp,
        });

        // 3. Credit each staff wallet with its allocated share
        let amounts = allocate_pool(self.pool, &self.shares);
        let mut allocated = Vec::with_capacity(self.shares.len());
        let mut effects = vec![
            SideEffect::audit(
                AuditAction::TipsDistributed,
                "wallet",
                source.id,
                serde_json::json!({
                    "pool": self.pool,
                    "currency": source.currency,
                    "recipients": self.shares.iter().map(|s| s.wallet_id).collect::<Vec<_>>(),
                }),
            ),
            SideEffect::broadcast(
                "wallet",
                "updated",
                source.id,
                Some(serde_json::to_value(&source).unwrap_or_default()),
            ),
        ];

        for (share, amount) in self.shares.iter().zip(amounts) {
            let mut wallet = ctx.wallet(share.wallet_id)?;
            if wallet.kind != WalletKind::Staff {
                return Err(OpError::Validation(format!(
                    "Wallet {} is not a staff wallet",
                    wallet.id
                )));
            }
            if wallet.currency != source.currency {
                return Err(OpError::Validation(format!(
                    "Wallet {} uses {}, tip pool is {}",
                    wallet.id, wallet.currency, source.currency
                )));
            }

            allocated.push(AllocatedShare {
                wallet_id: wallet.id,
                amount,
            });
            if amount == Decimal::ZERO {
                continue;
            }

            wallet.balance += amount;
            wallet.updated_at = meta.timestamp;
            ctx.stage_wallet(wallet.clone());
            ctx.stage_wallet_entry(WalletEntry {
                id: snowflake_id(),
                wallet_id: wallet.id,
                kind: WalletEntryKind::TipShare,
                amount,
                note: self.note.clone(),
                created_at: meta.timestamp,
            });

            effects.push(SideEffect::notify(
                wallet.owner_id,
                NotificationKind::TipReceived,
                "wallet.tip_received",
                serde_json::json!({
                    "wallet_id": wallet.id,
                    "amount": amount,
                    "currency": wallet.currency,
                }),
                "staff",
                "wallets",
            ));
            effects.push(SideEffect::broadcast(
                "wallet",
                "updated",
                wallet.id,
                Some(serde_json::to_value(&wallet).unwrap_or_default()),
            ));
        }

        Ok(Outcome::new(
            TipsResult {
                source_wallet: source,
                shares: allocated,
            },
            effects,
        ))
    }
}
