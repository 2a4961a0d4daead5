//! Per-inquiry real-time fan-out
//!
//! One broadcast channel per inquiry, created lazily on first subscribe or
//! publish and dropped when the last subscriber leaves. Subscribers only
//! ever receive messages for the inquiry they joined; switching inquiries
//! means dropping one subscription and opening another, so no stale
//! deliveries cross over. Disconnected subscribers simply miss events; the
//! persisted message log is the durable source of truth.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::messages::MessageResponse;

/// Event delivered to channel subscribers
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub message: MessageResponse,
}

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Default)]
pub struct RealtimeHub {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<MessageEvent>>>>,
}

/// Live subscription to one inquiry's channel. Leaves the channel when the
/// guard drops; the receiver may be moved out (e.g. into an SSE stream) as
/// long as the guard is kept alive alongside it.
pub struct Subscription {
    pub receiver: broadcast::Receiver<MessageEvent>,
    pub guard: ChannelGuard,
}

/// Drop handle that removes the channel once its last subscriber leaves
pub struct ChannelGuard {
    inquiry_id: Uuid,
    hub: RealtimeHub,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join an inquiry's channel
    pub fn subscribe(&self, inquiry_id: Uuid) -> Subscription {
        let receiver = {
            let mut channels = self.channels.write();
            channels
                .entry(inquiry_id)
                .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
                .subscribe()
        };

        tracing::debug!(inquiry_id = %inquiry_id, "Subscriber joined inquiry channel");

        Subscription {
            receiver,
            guard: ChannelGuard {
                inquiry_id,
                hub: self.clone(),
            },
        }
    }

    /// Broadcast a new message to the inquiry's current subscribers.
    /// A channel with no subscribers is a no-op and gets cleaned up.
    pub fn publish(&self, inquiry_id: Uuid, event: MessageEvent) {
        let sender = self.channels.read().get(&inquiry_id).cloned();
        if let Some(sender) = sender {
            match sender.send(event) {
                Ok(delivered) => {
                    tracing::debug!(
                        inquiry_id = %inquiry_id,
                        subscribers = delivered,
                        "Message broadcast"
                    );
                }
                Err(_) => {
                    // No live receivers left on this channel
                    self.leave(inquiry_id);
                }
            }
        }
    }

    /// Number of live subscribers on an inquiry's channel
    pub fn subscriber_count(&self, inquiry_id: Uuid) -> usize {
        self.channels
            .read()
            .get(&inquiry_id)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    fn leave(&self, inquiry_id: Uuid) {
        let mut channels = self.channels.write();
        if let Some(sender) = channels.get(&inquiry_id) {
            if sender.receiver_count() == 0 {
                channels.remove(&inquiry_id);
                tracing::debug!(inquiry_id = %inquiry_id, "Inquiry channel closed");
            }
        }
    }
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.hub.leave(self.inquiry_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::messages::SenderRole;
    use chrono::Utc;

    fn event(inquiry_id: Uuid, body: &str) -> MessageEvent {
        MessageEvent {
            message: MessageResponse {
                id: Uuid::new_v4(),
                inquiry_id,
                sender_role: SenderRole::User,
                sender_id: Uuid::new_v4(),
                sender_name: Some("Test".into()),
                body: Some(body.into()),
                image_url: None,
                created_at: Utc::now(),
            },
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_message() {
        let hub = RealtimeHub::new();
        let inquiry = Uuid::new_v4();
        let mut sub = hub.subscribe(inquiry);

        hub.publish(inquiry, event(inquiry, "hello"));

        let received = sub.receiver.recv().await.unwrap();
        assert_eq!(received.message.body.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn no_cross_inquiry_delivery() {
        let hub = RealtimeHub::new();
        let inquiry_x = Uuid::new_v4();
        let inquiry_y = Uuid::new_v4();
        let mut sub_y = hub.subscribe(inquiry_y);

        hub.publish(inquiry_x, event(inquiry_x, "for x only"));

        assert!(matches!(
            sub_y.receiver.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn delivery_preserves_publish_order() {
        let hub = RealtimeHub::new();
        let inquiry = Uuid::new_v4();
        let mut sub = hub.subscribe(inquiry);

        hub.publish(inquiry, event(inquiry, "first"));
        hub.publish(inquiry, event(inquiry, "second"));

        assert_eq!(
            sub.receiver.recv().await.unwrap().message.body.as_deref(),
            Some("first")
        );
        assert_eq!(
            sub.receiver.recv().await.unwrap().message.body.as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn rejoining_does_not_replay_old_messages() {
        let hub = RealtimeHub::new();
        let inquiry = Uuid::new_v4();

        {
            let _sub = hub.subscribe(inquiry);
            hub.publish(inquiry, event(inquiry, "before leave"));
        }

        let mut sub = hub.subscribe(inquiry);
        assert!(matches!(
            sub.receiver.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        hub.publish(inquiry, event(inquiry, "after rejoin"));
        assert_eq!(
            sub.receiver.recv().await.unwrap().message.body.as_deref(),
            Some("after rejoin")
        );
    }

    #[tokio::test]
    async fn channel_is_removed_when_last_subscriber_leaves() {
        let hub = RealtimeHub::new();
        let inquiry = Uuid::new_v4();

        let sub_a = hub.subscribe(inquiry);
        let sub_b = hub.subscribe(inquiry);
        assert_eq!(hub.subscriber_count(inquiry), 2);

        drop(sub_a);
        assert_eq!(hub.subscriber_count(inquiry), 1);

        drop(sub_b);
        assert_eq!(hub.subscriber_count(inquiry), 0);
        assert!(hub.channels.read().is_empty());
    }
}
