//! Notification delivery
//!
//! Notifications enqueue onto an mpsc channel; a background worker forwards
//! them to the broadcast bus (targeted at the recipient) and, when
//! configured, to an external webhook. Delivery is best-effort: the
//! orchestrator records failures as warnings and moves on.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::effects::NotificationGateway;
use crate::effects::broadcast::BroadcastService;
use shared::message::{BusMessage, NotificationPayload};

/// Notification collaborator error
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification queue full")]
    QueueFull,

    #[error("notification worker stopped")]
    WorkerStopped,
}

/// Channel-backed notification gateway
///
/// `send` only enqueues; delivery happens in [`NotificationWorker`]. This
/// keeps the fan-out path non-blocking while still surfacing queue
/// saturation as a warning.
#[derive(Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<NotificationPayload>,
}

impl ChannelNotifier {
    /// Create the notifier and the receiver for its delivery worker
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<NotificationPayload>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl NotificationGateway for ChannelNotifier {
    async fn send(&self, notification: NotificationPayload) -> Result<(), NotifyError> {
        self.tx.try_send(notification).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => NotifyError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => NotifyError::WorkerStopped,
        })
    }
}

/// Notification delivery worker
///
/// Forwards each payload to the broadcast bus addressed at the recipient,
/// and optionally POSTs it to a webhook (push provider, CRM, ...).
pub struct NotificationWorker {
    broadcast: Arc<BroadcastService>,
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl NotificationWorker {
    pub fn new(broadcast: Arc<BroadcastService>, webhook_url: Option<String>) -> Self {
        Self {
            broadcast,
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    /// Run the worker (blocks until the channel closes)
    pub async fn run(self, mut rx: mpsc::Receiver<NotificationPayload>) {
        tracing::info!(
            webhook = self.webhook_url.is_some(),
            "Notification worker started"
        );

        while let Some(payload) = rx.recv().await {
            tracing::debug!(
                user_id = payload.user_id,
                kind = %payload.kind,
                message_key = %payload.message_key,
                "Delivering notification"
            );

            self.broadcast
                .publish(BusMessage::notification(&payload).with_target(payload.user_id));

            if let Some(url) = &self.webhook_url {
                match self.client.post(url).json(&payload).send().await {
                    Ok(resp) if !resp.status().is_success() => {
                        tracing::warn!(
                            status = %resp.status(),
                            user_id = payload.user_id,
                            "Notification webhook rejected payload"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Notification webhook unreachable");
                    }
                    _ => {}
                }
            }
        }

        tracing::info!("Notification channel closed, worker stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::NotificationKind;

    fn test_payload(user_id: i64) -> NotificationPayload {
        NotificationPayload {
            user_id,
            kind: NotificationKind::BookingStatusChanged,
            message_key: "booking.checked_in".to_string(),
            message_params: serde_json::json!({}),
            role: None,
            module: None,
            language_code: None,
        }
    }

    #[tokio::test]
    async fn send_enqueues_payload() {
        let (notifier, mut rx) = ChannelNotifier::new(4);
        notifier.send(test_payload(7)).await.unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.user_id, 7);
    }

    #[tokio::test]
    async fn send_reports_queue_full() {
        let (notifier, _rx) = ChannelNotifier::new(1);
        notifier.send(test_payload(1)).await.unwrap();
        let err = notifier.send(test_payload(2)).await.unwrap_err();
        assert!(matches!(err, NotifyError::QueueFull));
    }

    #[tokio::test]
    async fn send_reports_stopped_worker() {
        let (notifier, rx) = ChannelNotifier::new(1);
        drop(rx);
        let err = notifier.send(test_payload(1)).await.unwrap_err();
        assert!(matches!(err, NotifyError::WorkerStopped));
    }

    #[tokio::test]
    async fn worker_forwards_to_bus_with_target() {
        let broadcast = Arc::new(BroadcastService::new());
        let mut bus_rx = broadcast.subscribe();

        let (notifier, rx) = ChannelNotifier::new(4);
        let worker = NotificationWorker::new(broadcast, None);
        let handle = tokio::spawn(worker.run(rx));

        notifier.send(test_payload(42)).await.unwrap();

        let msg = bus_rx.recv().await.unwrap();
        assert_eq!(msg.target, Some(42));

        drop(notifier);
        handle.await.unwrap();
    }
}
