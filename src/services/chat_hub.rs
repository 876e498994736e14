//! In-process realtime fan-out for chat messages.
//!
//! Every stored message is published on one broadcast channel. Each live
//! subscriber (an SSE connection) filters the channel down to its own
//! conversation. Delivery order is whatever the channel delivers; a
//! subscriber that falls behind skips the messages it missed.

use futures::stream::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::models::chat::Message;

/// Broadcast hub shared by all handlers through `AppState`.
#[derive(Debug, Clone)]
pub struct ChatHub {
    tx: broadcast::Sender<Message>,
}

impl ChatHub {
    /// Create a hub buffering up to `capacity` messages per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a stored message. Returns how many subscribers received it.
    ///
    /// Having no subscribers is not an error.
    pub fn publish(&self, message: Message) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    /// Number of live subscribers across all conversations.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Stream of new messages for one conversation.
    ///
    /// The subscription starts now: earlier messages come from the history
    /// endpoint. The stream ends when the hub is dropped.
    pub fn subscribe(&self, conversation_id: Uuid) -> impl Stream<Item = Message> + use<> {
        let mut rx = self.tx.subscribe();

        async_stream::stream! {
            loop {
                match rx.recv().await {
                    Ok(message) if message.conversation_id == conversation_id => {
                        yield message;
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(%conversation_id, skipped, "Chat subscriber lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use futures::StreamExt;

    fn message(conversation_id: Uuid, body: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id,
            body: body.to_string(),
            from_admin: false,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn publish_without_subscribers() {
        let hub = ChatHub::new(8);
        assert_eq!(hub.publish(message(Uuid::new_v4(), "hi")), 0);
    }

    #[tokio::test]
    async fn subscriber_only_sees_its_conversation() {
        let hub = ChatHub::new(8);
        let mine = Uuid::new_v4();
        let other = Uuid::new_v4();

        let stream = hub.subscribe(mine);
        let mut stream = Box::pin(stream);
        assert_eq!(hub.subscriber_count(), 1);

        hub.publish(message(other, "not for you"));
        hub.publish(message(mine, "first"));
        hub.publish(message(mine, "second"));

        assert_eq!(stream.next().await.unwrap().body, "first");
        assert_eq!(stream.next().await.unwrap().body, "second");
    }

    #[tokio::test]
    async fn lagging_subscriber_skips_missed_messages() {
        let hub = ChatHub::new(2);
        let conversation = Uuid::new_v4();
        let mut stream = Box::pin(hub.subscribe(conversation));

        for body in ["a", "b", "c", "d"] {
            hub.publish(message(conversation, body));
        }

        assert_eq!(stream.next().await.unwrap().body, "c");
        assert_eq!(stream.next().await.unwrap().body, "d");
    }

    #[tokio::test]
    async fn stream_ends_when_hub_dropped() {
        let hub = ChatHub::new(4);
        let mut stream = Box::pin(hub.subscribe(Uuid::new_v4()));
        drop(hub);

        assert!(stream.next().await.is_none());
    }
}
