//! Wallet Model
//!
//! Balances use `rust_decimal::Decimal`; ledger entries are append-only and
//! every balance change has a matching entry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wallet owner kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Merchant,
    Staff,
}

/// Wallet entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub owner_id: i64,
    pub owner_name: String,
    pub kind: WalletKind,
    pub balance: Decimal,
    /// ISO 4217 code
    pub currency: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Ledger entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletEntryKind {
    /// Merchant requested a payout (debit)
    PayoutRequested,
    /// Tip pool debit on the merchant side
    TipPoolDebit,
    /// Tip share credited to a staff wallet
    TipShare,
    /// Manual adjustment
    Adjustment,
}

/// Append-only wallet ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: i64,
    pub wallet_id: i64,
    pub kind: WalletEntryKind,
    /// Signed amount: negative = debit, positive = credit
    pub amount: Decimal,
    pub note: Option<String>,
    pub created_at: i64,
}

/// One recipient's requested share in a tip distribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipShare {
    pub wallet_id: i64,
    /// Relative weight (e.g. hours worked); must be > 0
    pub weight: u32,
}
