//! Operation context
//!
//! Read/stage access to entities within one unit of work. Reads see the
//! transaction's view overlaid with anything the operation already staged;
//! nothing reaches the storage tables until the orchestrator persists the
//! staged writes and commits.

use redb::WriteTransaction;
use std::collections::HashMap;

use super::error::{OpError, OpResult};
use crate::store::MarketStorage;
use shared::models::{Booking, MenuItem, Venue, Wallet, WalletEntry};

/// Staged writes collected during one operation
#[derive(Default)]
pub struct StagedWrites {
    pub venues: Vec<Venue>,
    pub bookings: Vec<Booking>,
    pub wallets: Vec<Wallet>,
    pub menu_items: Vec<MenuItem>,
    pub wallet_entries: Vec<WalletEntry>,
}

impl StagedWrites {
    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
            && self.bookings.is_empty()
            && self.wallets.is_empty()
            && self.menu_items.is_empty()
            && self.wallet_entries.is_empty()
    }
}

/// Context handed to a domain operation
pub struct OperationContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a MarketStorage,
    venues: HashMap<i64, Venue>,
    bookings: HashMap<i64, Booking>,
    wallets: HashMap<i64, Wallet>,
    menu_items: HashMap<i64, MenuItem>,
    wallet_entries: Vec<WalletEntry>,
}

impl<'a> OperationContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a MarketStorage) -> Self {
        Self {
            txn,
            storage,
            venues: HashMap::new(),
            bookings: HashMap::new(),
            wallets: HashMap::new(),
            menu_items: HashMap::new(),
            wallet_entries: Vec::new(),
        }
    }

    // ── Reads (staged-first) ────────────────────────────────────────

    pub fn venue(&self, id: i64) -> OpResult<Venue> {
        if let Some(venue) = self.venues.get(&id) {
            return Ok(venue.clone());
        }
        self.storage
            .venue(self.txn, id)?
            .ok_or_else(|| OpError::NotFound(format!("Venue {id}")))
    }

    pub fn booking(&self, id: i64) -> OpResult<Booking> {
        if let Some(booking) = self.bookings.get(&id) {
            return Ok(booking.clone());
        }
        self.storage
            .booking(self.txn, id)?
            .ok_or_else(|| OpError::NotFound(format!("Booking {id}")))
    }

    pub fn wallet(&self, id: i64) -> OpResult<Wallet> {
        if let Some(wallet) = self.wallets.get(&id) {
            return Ok(wallet.clone());
        }
        self.storage
            .wallet(self.txn, id)?
            .ok_or_else(|| OpError::NotFound(format!("Wallet {id}")))
    }

    pub fn menu_item(&self, id: i64) -> OpResult<MenuItem> {
        if let Some(item) = self.menu_items.get(&id) {
            return Ok(item.clone());
        }
        self.storage
            .menu_item(self.txn, id)?
            .ok_or_else(|| OpError::NotFound(format!("Menu item {id}")))
    }

    /// All bookings for a venue with staged versions overlaid
    pub fn bookings_for_venue(&self, venue_id: i64) -> OpResult<Vec<Booking>> {
        let mut bookings = self.storage.bookings_for_venue(self.txn, venue_id)?;
        for booking in &mut bookings {
            if let Some(staged) = self.bookings.get(&booking.id) {
                *booking = staged.clone();
            }
        }
        // Newly staged bookings not yet in the index
        for staged in self.bookings.values() {
            if staged.venue_id == venue_id && !bookings.iter().any(|b| b.id == staged.id) {
                bookings.push(staged.clone());
            }
        }
        bookings.sort_by_key(|b| b.id);
        Ok(bookings)
    }

    // ── Staging ─────────────────────────────────────────────────────

    pub fn stage_venue(&mut self, venue: Venue) {
        self.venues.insert(venue.id, venue);
    }

    pub fn stage_booking(&mut self, booking: Booking) {
        self.bookings.insert(booking.id, booking);
    }

    pub fn stage_wallet(&mut self, wallet: Wallet) {
        self.wallets.insert(wallet.id, wallet);
    }

    pub fn stage_menu_item(&mut self, item: MenuItem) {
        self.menu_items.insert(item.id, item);
    }

    pub fn stage_wallet_entry(&mut self, entry: WalletEntry) {
        self.wallet_entries.push(entry);
    }

    /// Consume the context and hand the staged writes to the orchestrator
    pub fn finish(self) -> StagedWrites {
        StagedWrites {
            venues: self.venues.into_values().collect(),
            bookings: self.bookings.into_values().collect(),
            wallets: self.wallets.into_values().collect(),
            menu_items: self.menu_items.into_values().collect(),
            wallet_entries: self.wallet_entries,
        }
    }
}
