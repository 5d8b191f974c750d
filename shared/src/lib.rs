//! Shared types for the Plaza marketplace backend
//!
//! Common types used by the server and (future) clients: domain models,
//! bus message types, and small utilities.

pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType};
