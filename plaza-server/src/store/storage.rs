//! redb-based storage layer for marketplace entities
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `venues` | `venue_id` | `Venue` | Venue registry |
//! | `bookings` | `booking_id` | `Booking` | Bookings (all statuses) |
//! | `bookings_by_venue` | `(venue_id, booking_id)` | `()` | Per-venue index |
//! | `wallets` | `wallet_id` | `Wallet` | Wallet balances |
//! | `wallet_entries` | `(wallet_id, entry_id)` | `WalletEntry` | Append-only ledger |
//! | `menu_items` | `item_id` | `MenuItem` | Menu catalog |
//! | `menu_by_venue` | `(venue_id, item_id)` | `()` | Per-venue index |
//! | `processed_requests` | `request_id` | `()` | Idempotency check |
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns (copy-on-write
//! with atomic pointer swap), so the database file is always in a consistent
//! state even across hard shutdowns.
//!
//! Rows are JSON-encoded; schema evolution is handled by serde defaults.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::models::{Booking, MenuItem, Venue, Wallet, WalletEntry};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Venue registry: key = venue_id, value = JSON-serialized Venue
const VENUES_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("venues");

/// Bookings: key = booking_id, value = JSON-serialized Booking
const BOOKINGS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("bookings");

/// Per-venue booking index: key = (venue_id, booking_id), value = empty
const BOOKINGS_BY_VENUE_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("bookings_by_venue");

/// Wallets: key = wallet_id, value = JSON-serialized Wallet
const WALLETS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("wallets");

/// Wallet ledger: key = (wallet_id, entry_id), value = JSON-serialized WalletEntry
const WALLET_ENTRIES_TABLE: TableDefinition<(i64, i64), &[u8]> =
    TableDefinition::new("wallet_entries");

/// Menu catalog: key = item_id, value = JSON-serialized MenuItem
const MENU_ITEMS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("menu_items");

/// Per-venue menu index: key = (venue_id, item_id), value = empty
const MENU_BY_VENUE_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("menu_by_venue");

/// Processed request IDs: key = request_id, value = empty (idempotency)
const PROCESSED_REQUESTS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_requests");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

fn encode<T: serde::Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Marketplace storage backed by redb
#[derive(Clone)]
pub struct MarketStorage {
    db: Arc<Database>,
}

impl MarketStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(VENUES_TABLE)?;
            let _ = write_txn.open_table(BOOKINGS_TABLE)?;
            let _ = write_txn.open_table(BOOKINGS_BY_VENUE_TABLE)?;
            let _ = write_txn.open_table(WALLETS_TABLE)?;
            let _ = write_txn.open_table(WALLET_ENTRIES_TABLE)?;
            let _ = write_txn.open_table(MENU_ITEMS_TABLE)?;
            let _ = write_txn.open_table(MENU_BY_VENUE_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction (the unit of work)
    ///
    /// Blocks while another writer holds the transaction; redb serializes
    /// writers, which is what gives concurrent operations on the same entity
    /// a strict happens-before order.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Request Idempotency ==========

    /// Check if a request has been processed
    pub fn is_request_processed(&self, request_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        Ok(table.get(request_id)?.is_some())
    }

    /// Check if a request has been processed (within transaction)
    pub fn is_request_processed_txn(
        &self,
        txn: &WriteTransaction,
        request_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        Ok(table.get(request_id)?.is_some())
    }

    /// Mark a request as processed
    pub fn mark_request_processed(
        &self,
        txn: &WriteTransaction,
        request_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        table.insert(request_id, ())?;
        Ok(())
    }

    // ========== Venues ==========

    /// Load a venue within a write transaction
    pub fn venue(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<Venue>> {
        let table = txn.open_table(VENUES_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Store a venue within a write transaction
    pub fn put_venue(&self, txn: &WriteTransaction, venue: &Venue) -> StorageResult<()> {
        let mut table = txn.open_table(VENUES_TABLE)?;
        table.insert(venue.id, encode(venue)?.as_slice())?;
        Ok(())
    }

    /// Load a venue (read-only)
    pub fn get_venue(&self, id: i64) -> StorageResult<Option<Venue>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VENUES_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// List all venues (read-only)
    pub fn list_venues(&self) -> StorageResult<Vec<Venue>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(VENUES_TABLE)?;
        let mut venues = Vec::new();
        for item in table.iter()? {
            let (_, guard) = item?;
            venues.push(decode(guard.value())?);
        }
        Ok(venues)
    }

    // ========== Bookings ==========

    /// Load a booking within a write transaction
    pub fn booking(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<Booking>> {
        let table = txn.open_table(BOOKINGS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Store a booking and maintain the per-venue index
    pub fn put_booking(&self, txn: &WriteTransaction, booking: &Booking) -> StorageResult<()> {
        {
            let mut table = txn.open_table(BOOKINGS_TABLE)?;
            table.insert(booking.id, encode(booking)?.as_slice())?;
        }
        let mut index = txn.open_table(BOOKINGS_BY_VENUE_TABLE)?;
        index.insert((booking.venue_id, booking.id), ())?;
        Ok(())
    }

    /// All bookings for a venue, within a write transaction
    ///
    /// Used by capacity checks and waitlist scans; the result is ordered by
    /// booking ID, which for snowflake IDs is creation order.
    pub fn bookings_for_venue(
        &self,
        txn: &WriteTransaction,
        venue_id: i64,
    ) -> StorageResult<Vec<Booking>> {
        let index = txn.open_table(BOOKINGS_BY_VENUE_TABLE)?;
        let bookings_table = txn.open_table(BOOKINGS_TABLE)?;
        let mut bookings = Vec::new();
        for item in index.range((venue_id, i64::MIN)..=(venue_id, i64::MAX))? {
            let (key, _) = item?;
            let (_, booking_id) = key.value();
            if let Some(guard) = bookings_table.get(booking_id)? {
                bookings.push(decode(guard.value())?);
            }
        }
        Ok(bookings)
    }

    /// Load a booking (read-only)
    pub fn get_booking(&self, id: i64) -> StorageResult<Option<Booking>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BOOKINGS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All bookings for a venue (read-only)
    pub fn get_bookings_for_venue(&self, venue_id: i64) -> StorageResult<Vec<Booking>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(BOOKINGS_BY_VENUE_TABLE)?;
        let bookings_table = read_txn.open_table(BOOKINGS_TABLE)?;
        let mut bookings = Vec::new();
        for item in index.range((venue_id, i64::MIN)..=(venue_id, i64::MAX))? {
            let (key, _) = item?;
            let (_, booking_id) = key.value();
            if let Some(guard) = bookings_table.get(booking_id)? {
                bookings.push(decode(guard.value())?);
            }
        }
        Ok(bookings)
    }

    // ========== Wallets ==========

    /// Load a wallet within a write transaction
    pub fn wallet(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<Wallet>> {
        let table = txn.open_table(WALLETS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Store a wallet within a write transaction
    pub fn put_wallet(&self, txn: &WriteTransaction, wallet: &Wallet) -> StorageResult<()> {
        let mut table = txn.open_table(WALLETS_TABLE)?;
        table.insert(wallet.id, encode(wallet)?.as_slice())?;
        Ok(())
    }

    /// Append a ledger entry within a write transaction
    pub fn append_wallet_entry(
        &self,
        txn: &WriteTransaction,
        entry: &WalletEntry,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(WALLET_ENTRIES_TABLE)?;
        table.insert((entry.wallet_id, entry.id), encode(entry)?.as_slice())?;
        Ok(())
    }

    /// Load a wallet (read-only)
    pub fn get_wallet(&self, id: i64) -> StorageResult<Option<Wallet>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Ledger entries for a wallet (read-only, oldest first)
    pub fn get_wallet_entries(&self, wallet_id: i64) -> StorageResult<Vec<WalletEntry>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_ENTRIES_TABLE)?;
        let mut entries = Vec::new();
        for item in table.range((wallet_id, i64::MIN)..=(wallet_id, i64::MAX))? {
            let (_, guard) = item?;
            entries.push(decode(guard.value())?);
        }
        Ok(entries)
    }

    // ========== Menu Items ==========

    /// Load a menu item within a write transaction
    pub fn menu_item(&self, txn: &WriteTransaction, id: i64) -> StorageResult<Option<MenuItem>> {
        let table = txn.open_table(MENU_ITEMS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Store a menu item and maintain the per-venue index
    pub fn put_menu_item(&self, txn: &WriteTransaction, item: &MenuItem) -> StorageResult<()> {
        {
            let mut table = txn.open_table(MENU_ITEMS_TABLE)?;
            table.insert(item.id, encode(item)?.as_slice())?;
        }
        let mut index = txn.open_table(MENU_BY_VENUE_TABLE)?;
        index.insert((item.venue_id, item.id), ())?;
        Ok(())
    }

    /// Load a menu item (read-only)
    pub fn get_menu_item(&self, id: i64) -> StorageResult<Option<MenuItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MENU_ITEMS_TABLE)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All menu items for a venue (read-only)
    pub fn get_menu_for_venue(&self, venue_id: i64) -> StorageResult<Vec<MenuItem>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(MENU_BY_VENUE_TABLE)?;
        let items_table = read_txn.open_table(MENU_ITEMS_TABLE)?;
        let mut items = Vec::new();
        for item in index.range((venue_id, i64::MIN)..=(venue_id, i64::MAX))? {
            let (key, _) = item?;
            let (_, item_id) = key.value();
            if let Some(guard) = items_table.get(item_id)? {
                items.push(decode(guard.value())?);
            }
        }
        Ok(items)
    }
}
