//! Message bus types shared between the server and realtime clients.
//!
//! Messages travel in-process over the broadcast bus and over the sync
//! WebSocket as JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Bus event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// User-facing notification
    Notification,
    /// Resource sync signal (created / updated / deleted)
    Sync,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Notification => write!(f, "notification"),
            EventType::Sync => write!(f, "sync"),
        }
    }
}

/// Bus message envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    /// Target user ID; `None` broadcasts to everyone
    pub target: Option<i64>,
    pub payload: serde_json::Value,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: serde_json::Value) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            target: None,
            payload,
        }
    }

    /// Address the message to a single user
    pub fn with_target(mut self, target: i64) -> Self {
        self.target = Some(target);
        self
    }

    /// Create a notification message
    pub fn notification(payload: &NotificationPayload) -> Self {
        Self::new(
            EventType::Notification,
            serde_json::to_value(payload).expect("Failed to serialize notification"),
        )
    }

    /// Create a sync signal message
    pub fn sync(payload: &SyncPayload) -> Self {
        Self::new(
            EventType::Sync,
            serde_json::to_value(payload).expect("Failed to serialize sync payload"),
        )
    }

    /// Parse the payload into a concrete type
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
