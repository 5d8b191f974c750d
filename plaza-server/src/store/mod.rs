//! Persistence gateway
//!
//! redb-backed storage for all marketplace entities. One
//! [`redb::WriteTransaction`] is the unit of work shared by a domain
//! operation and its staged writes; dropping the transaction without
//! committing rolls everything back.

mod storage;

pub use storage::{MarketStorage, StorageError, StorageResult};
