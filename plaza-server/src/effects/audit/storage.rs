//! Audit log redb storage layer
//!
//! Append-only design: there are no delete/update interfaces.
//! The SHA256 hash chain makes tampering detectable.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::types::{AuditAction, AuditChainVerification, AuditEntry, AuditQuery};

/// Audit log: key = sequence, value = JSON-serialized AuditEntry
const AUDIT_LOG_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("audit_log");

/// Storage errors
#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redb::DatabaseError> for AuditStorageError {
    fn from(err: redb::DatabaseError) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

impl From<redb::TransactionError> for AuditStorageError {
    fn from(err: redb::TransactionError) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

impl From<redb::TableError> for AuditStorageError {
    fn from(err: redb::TableError) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

impl From<redb::StorageError> for AuditStorageError {
    fn from(err: redb::StorageError) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

impl From<redb::CommitError> for AuditStorageError {
    fn from(err: redb::CommitError) -> Self {
        AuditStorageError::Database(err.to_string())
    }
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

/// Hash of the entry, covering the previous hash and all stored fields.
fn compute_audit_hash(prev_hash: &str, entry: &HashInput<'_>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(entry.sequence.to_be_bytes());
    hasher.update(entry.timestamp.to_be_bytes());
    hasher.update(entry.action.to_string().as_bytes());
    hasher.update(entry.resource_type.as_bytes());
    hasher.update(entry.resource_id.as_bytes());
    if let Some(id) = entry.operator_id {
        hasher.update(id.to_be_bytes());
    }
    if let Some(name) = entry.operator_name {
        hasher.update(name.as_bytes());
    }
    if let Some(role) = entry.operator_role {
        hasher.update(role.as_bytes());
    }
    if let Some(ip) = entry.ip_address {
        hasher.update(ip.as_bytes());
    }
    hasher.update(entry.details.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

struct HashInput<'a> {
    sequence: u64,
    timestamp: i64,
    action: AuditAction,
    resource_type: &'a str,
    resource_id: &'a str,
    operator_id: Option<i64>,
    operator_name: Option<&'a str>,
    operator_role: Option<&'a str>,
    ip_address: Option<&'a str>,
    details: &'a serde_json::Value,
}

/// Audit log storage (redb)
///
/// Append-only design:
/// - only `append` and read methods are provided
/// - no delete/update interface
/// - SHA256 hash chain ensures integrity
///
/// The sequence read and the insert happen inside one write transaction, so
/// concurrent appends cannot produce duplicate sequence numbers.
#[derive(Clone)]
pub struct AuditStorage {
    db: Arc<Database>,
}

impl AuditStorage {
    /// Open or create the audit database at the given path
    pub fn open(path: impl AsRef<Path>) -> AuditStorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory audit database (for testing)
    pub fn open_in_memory() -> AuditStorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> AuditStorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(AUDIT_LOG_TABLE)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Append one audit entry
    ///
    /// 1. read the current max sequence and last hash
    /// 2. compute the new entry's hash
    /// 3. insert and commit
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &self,
        action: AuditAction,
        resource_type: String,
        resource_id: String,
        operator_id: Option<i64>,
        operator_name: Option<String>,
        operator_role: Option<String>,
        ip_address: Option<String>,
        details: serde_json::Value,
    ) -> AuditStorageResult<AuditEntry> {
        let txn = self.db.begin_write()?;
        let entry = {
            let mut table = txn.open_table(AUDIT_LOG_TABLE)?;

            // 1. Last sequence and hash within the same write transaction
            let (sequence, prev_hash) = match table.last()? {
                Some((key, value)) => {
                    let last: AuditEntry = serde_json::from_slice(value.value())?;
                    (key.value() + 1, last.curr_hash)
                }
                None => (1, "genesis".to_string()),
            };

            // 2. Compute hash (all stored fields participate)
            let timestamp = shared::util::now_millis();
            let curr_hash = compute_audit_hash(
                &prev_hash,
                &HashInput {
                    sequence,
                    timestamp,
                    action,
                    resource_type: &resource_type,
                    resource_id: &resource_id,
                    operator_id,
                    operator_name: operator_name.as_deref(),
                    operator_role: operator_role.as_deref(),
                    ip_address: ip_address.as_deref(),
                    details: &details,
                },
            );

            let entry = AuditEntry {
                id: sequence,
                timestamp,
                action,
                resource_type,
                resource_id,
                operator_id,
                operator_name,
                operator_role,
                ip_address,
                details,
                prev_hash,
                curr_hash,
            };

            // 3. Insert
            table.insert(sequence, serde_json::to_vec(&entry)?.as_slice())?;
            entry
        };
        txn.commit()?;
        Ok(entry)
    }

    /// Query audit entries, newest first
    pub fn query(&self, q: &AuditQuery) -> AuditStorageResult<(Vec<AuditEntry>, u64)> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AUDIT_LOG_TABLE)?;

        let limit = q.limit.unwrap_or(100);
        let mut entries = Vec::new();
        let mut total = 0u64;

        for item in table.iter()?.rev() {
            let (_, guard) = item?;
            let entry: AuditEntry = serde_json::from_slice(guard.value())?;

            if let Some(from) = q.from
                && entry.timestamp < from
            {
                continue;
            }
            if let Some(to) = q.to
                && entry.timestamp > to
            {
                continue;
            }
            if let Some(action) = q.action
                && entry.action != action
            {
                continue;
            }
            if let Some(operator_id) = q.operator_id
                && entry.operator_id != Some(operator_id)
            {
                continue;
            }
            if let Some(resource_type) = &q.resource_type
                && entry.resource_type != *resource_type
            {
                continue;
            }

            total += 1;
            if (entries.len() as u64) < limit {
                entries.push(entry);
            }
        }

        Ok((entries, total))
    }

    /// Last `n` entries, newest first
    pub fn query_last(&self, n: u64) -> AuditStorageResult<Vec<AuditEntry>> {
        self.query(&AuditQuery {
            limit: Some(n),
            ..AuditQuery::default()
        })
        .map(|(entries, _)| entries)
    }

    /// Verify hash chain integrity over an optional sequence range
    pub fn verify_chain(
        &self,
        from: Option<u64>,
        to: Option<u64>,
    ) -> AuditStorageResult<AuditChainVerification> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AUDIT_LOG_TABLE)?;

        let mut checked = 0u64;
        let mut prev_hash: Option<String> = None;

        for item in table.range(from.unwrap_or(0)..=to.unwrap_or(u64::MAX))? {
            let (_, guard) = item?;
            let entry: AuditEntry = serde_json::from_slice(guard.value())?;

            // Linkage check (skipped for the first entry of a partial range)
            if let Some(prev) = &prev_hash
                && entry.prev_hash != *prev
            {
                return Ok(AuditChainVerification {
                    valid: false,
                    checked,
                    broken_at: Some(entry.id),
                });
            }

            // Recompute the entry hash
            let expected = compute_audit_hash(
                &entry.prev_hash,
                &HashInput {
                    sequence: entry.id,
                    timestamp: entry.timestamp,
                    action: entry.action,
                    resource_type: &entry.resource_type,
                    resource_id: &entry.resource_id,
                    operator_id: entry.operator_id,
                    operator_name: entry.operator_name.as_deref(),
                    operator_role: entry.operator_role.as_deref(),
                    ip_address: entry.ip_address.as_deref(),
                    details: &entry.details,
                },
            );
            if expected != entry.curr_hash {
                return Ok(AuditChainVerification {
                    valid: false,
                    checked,
                    broken_at: Some(entry.id),
                });
            }

            prev_hash = Some(entry.curr_hash);
            checked += 1;
        }

        Ok(AuditChainVerification {
            valid: true,
            checked,
            broken_at: None,
        })
    }
}
