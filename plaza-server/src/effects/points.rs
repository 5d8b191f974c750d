//! Gamification points ledger
//!
//! Append-only points records plus a per-user balance, stored in redb.
//! Awards run post-commit in their own short transaction; a failure here
//! never rolls back the domain write; the orchestrator captures it as a
//! `gamification_error` warning instead.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use crate::effects::PointsLedger;
use shared::models::{PointsAward, PointsRecord};
use shared::util::{now_millis, snowflake_id};

/// Points records: key = (user_id, record_id), value = JSON-serialized PointsRecord
const POINTS_RECORDS_TABLE: TableDefinition<(i64, i64), &[u8]> =
    TableDefinition::new("points_records");

/// Points balances: key = user_id, value = balance
const POINTS_BALANCE_TABLE: TableDefinition<i64, i64> = TableDefinition::new("points_balance");

/// Points collaborator error
#[derive(Debug, thiserror::Error)]
pub enum PointsError {
    #[error("points storage failure: {0}")]
    Storage(String),

    #[error("invalid award: {0}")]
    InvalidAward(String),
}

impl From<redb::DatabaseError> for PointsError {
    fn from(err: redb::DatabaseError) -> Self {
        PointsError::Storage(err.to_string())
    }
}

impl From<redb::TransactionError> for PointsError {
    fn from(err: redb::TransactionError) -> Self {
        PointsError::Storage(err.to_string())
    }
}

impl From<redb::TableError> for PointsError {
    fn from(err: redb::TableError) -> Self {
        PointsError::Storage(err.to_string())
    }
}

impl From<redb::StorageError> for PointsError {
    fn from(err: redb::StorageError) -> Self {
        PointsError::Storage(err.to_string())
    }
}

impl From<redb::CommitError> for PointsError {
    fn from(err: redb::CommitError) -> Self {
        PointsError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PointsError {
    fn from(err: serde_json::Error) -> Self {
        PointsError::Storage(err.to_string())
    }
}

/// redb-backed points ledger
#[derive(Clone)]
pub struct StoredPointsLedger {
    db: Arc<Database>,
}

impl StoredPointsLedger {
    /// Open or create the points database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PointsError> {
        let db = Database::create(path)?;
        let ledger = Self { db: Arc::new(db) };
        ledger.init_tables()?;
        Ok(ledger)
    }

    /// Open an in-memory points database (for testing)
    pub fn open_in_memory() -> Result<Self, PointsError> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let ledger = Self { db: Arc::new(db) };
        ledger.init_tables()?;
        Ok(ledger)
    }

    fn init_tables(&self) -> Result<(), PointsError> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(POINTS_RECORDS_TABLE)?;
            let _ = txn.open_table(POINTS_BALANCE_TABLE)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Current balance for a user (0 if never awarded)
    pub fn balance(&self, user_id: i64) -> Result<i64, PointsError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(POINTS_BALANCE_TABLE)?;
        Ok(table.get(user_id)?.map(|g| g.value()).unwrap_or(0))
    }

    /// All award records for a user, oldest first
    pub fn records(&self, user_id: i64) -> Result<Vec<PointsRecord>, PointsError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(POINTS_RECORDS_TABLE)?;
        let mut records = Vec::new();
        for item in table.range((user_id, i64::MIN)..=(user_id, i64::MAX))? {
            let (_, guard) = item?;
            records.push(serde_json::from_slice(guard.value())?);
        }
        Ok(records)
    }
}

#[async_trait::async_trait]
impl PointsLedger for StoredPointsLedger {
    async fn award(&self, award: PointsAward) -> Result<PointsRecord, PointsError> {
        if award.points <= 0 {
            return Err(PointsError::InvalidAward(format!(
                "points must be positive, got {}",
                award.points
            )));
        }

        let record = PointsRecord {
            id: snowflake_id(),
            user_id: award.user_id,
            action: award.action,
            points: award.points,
            metadata: award.metadata,
            created_at: now_millis(),
        };

        let txn = self.db.begin_write()?;
        {
            let mut records = txn.open_table(POINTS_RECORDS_TABLE)?;
            records.insert(
                (record.user_id, record.id),
                serde_json::to_vec(&record)?.as_slice(),
            )?;

            let mut balances = txn.open_table(POINTS_BALANCE_TABLE)?;
            let current = balances.get(record.user_id)?.map(|g| g.value()).unwrap_or(0);
            balances.insert(record.user_id, current + record.points)?;
        }
        txn.commit()?;

        tracing::debug!(
            user_id = record.user_id,
            action = %record.action,
            points = record.points,
            "Points awarded"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_award(user_id: i64, points: i64) -> PointsAward {
        PointsAward {
            user_id,
            action: "booking_check_in".to_string(),
            points,
            metadata: serde_json::json!({"booking_id": 42}),
        }
    }

    #[tokio::test]
    async fn award_accumulates_balance() {
        let ledger = StoredPointsLedger::open_in_memory().unwrap();
        ledger.award(test_award(7, 25)).await.unwrap();
        ledger.award(test_award(7, 10)).await.unwrap();

        assert_eq!(ledger.balance(7).unwrap(), 35);
        assert_eq!(ledger.records(7).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn award_rejects_non_positive_points() {
        let ledger = StoredPointsLedger::open_in_memory().unwrap();
        let err = ledger.award(test_award(7, 0)).await.unwrap_err();
        assert!(matches!(err, PointsError::InvalidAward(_)));
        assert_eq!(ledger.balance(7).unwrap(), 0);
    }

    #[tokio::test]
    async fn balances_are_per_user() {
        let ledger = StoredPointsLedger::open_in_memory().unwrap();
        ledger.award(test_award(1, 5)).await.unwrap();
        ledger.award(test_award(2, 8)).await.unwrap();

        assert_eq!(ledger.balance(1).unwrap(), 5);
        assert_eq!(ledger.balance(2).unwrap(), 8);
        assert_eq!(ledger.balance(3).unwrap(), 0);
    }
}
