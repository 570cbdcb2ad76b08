use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Realtime message pushed to connected clients (SSE).
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Dotted topic string, e.g. `inventory.movement_recorded`.
    pub topic: String,
    pub payload: serde_json::Value,
    pub emitted_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
            emitted_at: Utc::now(),
        }
    }
}

/// In-process pub/sub hub over a lossy `tokio::sync::broadcast` channel.
///
/// Publishing never blocks and never fails the caller: with no subscribers
/// the message is dropped, and slow subscribers are lagged past.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a notification (lossy; no backpressure on callers).
    pub fn publish(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            // No active subscribers; nothing to deliver.
            tracing::trace!("notification dropped: {}", e.0.topic);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_notification() {
        let hub = NotificationHub::default();
        let mut rx = hub.subscribe();

        hub.publish(Notification::new(
            crate::topics::MOVEMENT_RECORDED,
            serde_json::json!({"product_id": "p1"}),
        ));

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, crate::topics::MOVEMENT_RECORDED);
        assert_eq!(msg.payload["product_id"], "p1");
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let hub = NotificationHub::default();
        // Must not panic or block.
        hub.publish(Notification::new("x", serde_json::Value::Null));
        assert_eq!(hub.subscriber_count(), 0);
    }
}
