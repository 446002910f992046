use crate::domain::ports::MessagePublisher;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// A message as seen by a topic subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub id: String,
    pub topic: String,
    pub data: Bytes,
}

/// In-process topic bus.
///
/// Each subscriber gets its own bounded channel and sees every message
/// published after it subscribed. Publishing to a topic without subscribers
/// succeeds and drops the message.
#[derive(Default, Clone)]
pub struct LocalBus {
    topics: Arc<RwLock<HashMap<String, Vec<mpsc::Sender<BusMessage>>>>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, topic: &str) -> mpsc::Receiver<BusMessage> {
        let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
        let mut topics = self.topics.write().await;
        topics.entry(topic.to_string()).or_default().push(tx);
        rx
    }
}

#[async_trait]
impl MessagePublisher for LocalBus {
    async fn publish(&self, topic: &str, data: Bytes) -> Result<String> {
        let message = BusMessage {
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            data,
        };

        let senders = {
            let mut topics = self.topics.write().await;
            let Some(senders) = topics.get_mut(topic) else {
                tracing::debug!(topic, "no subscribers, dropping message");
                return Ok(message.id);
            };
            // Forget subscribers that have gone away.
            senders.retain(|sender| !sender.is_closed());
            senders.clone()
        };

        let mut delivered = 0;
        for sender in senders {
            // A receiver dropped since the retain above is skipped like the rest.
            if sender.send(message.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        tracing::debug!(topic, message_id = %message.id, delivered, "published message");
        Ok(message.id)
    }
}
