//! Realtime broadcast bus
//!
//! Resource change notifications fan out to every connected client over a
//! `tokio::sync::broadcast` channel; the sync WebSocket endpoint subscribes
//! and forwards messages as JSON. Sends are fire-and-forget: a bus with no
//! subscribers is not an error.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::effects::BroadcastChannel;
use shared::message::{BusMessage, SyncPayload};

/// Broadcast channel capacity
///
/// Sized for bursts (a tip distribution touches every staff wallet); slow
/// subscribers that lag behind this many messages miss the gap and resync
/// via the version number.
const BUS_CAPACITY: usize = 4096;

/// Resource version manager
///
/// Lock-free concurrent version numbers, one per resource type. Used to
/// stamp sync payloads with an increasing version so clients can detect
/// missed updates.
#[derive(Debug, Default)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment the version for a resource and return the new value
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Current version for a resource (0 if never synced)
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

/// In-process broadcast bus
#[derive(Clone)]
pub struct BroadcastService {
    tx: broadcast::Sender<BusMessage>,
    versions: Arc<ResourceVersions>,
}

impl std::fmt::Debug for BroadcastService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastService").finish_non_exhaustive()
    }
}

impl BroadcastService {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            tx,
            versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// Subscribe to the bus (WebSocket endpoint, workers, tests)
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// Publish a raw bus message
    pub fn publish(&self, msg: BusMessage) {
        if self.tx.send(msg).is_err() {
            tracing::debug!("Broadcast skipped: no active subscribers");
        }
    }

    /// Current version for a resource
    pub fn version(&self, resource: &str) -> u64 {
        self.versions.get(resource)
    }
}

impl Default for BroadcastService {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastChannel for BroadcastService {
    /// Broadcast a resource change to all clients
    ///
    /// The version number is incremented per resource type so clients can
    /// detect gaps and trigger a full refresh.
    fn emit(&self, resource: &str, action: &str, id: &str, data: Option<serde_json::Value>) {
        let version = self.versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data,
        };
        self.publish(BusMessage::sync(&payload));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::EventType;

    #[test]
    fn emit_increments_version_per_resource() {
        let bus = BroadcastService::new();
        let mut rx = bus.subscribe();

        bus.emit("booking", "updated", "1", None);
        bus.emit("booking", "updated", "2", None);
        bus.emit("wallet", "updated", "9", None);

        let first: SyncPayload = rx.try_recv().unwrap().parse_payload().unwrap();
        let second: SyncPayload = rx.try_recv().unwrap().parse_payload().unwrap();
        let third: SyncPayload = rx.try_recv().unwrap().parse_payload().unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(third.resource, "wallet");
        assert_eq!(third.version, 1);
    }

    #[test]
    fn emit_without_subscribers_is_not_an_error() {
        let bus = BroadcastService::new();
        bus.emit("booking", "created", "1", Some(serde_json::json!({"x": 1})));
        assert_eq!(bus.version("booking"), 1);
    }

    #[test]
    fn sync_messages_carry_event_type() {
        let bus = BroadcastService::new();
        let mut rx = bus.subscribe();
        bus.emit("menu_item", "deleted", "3", None);
        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.event_type, EventType::Sync);
    }
}
