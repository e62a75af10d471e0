//! In-process chat relay.
//!
//! Each conversation gets a broadcast channel; websocket clients that joined
//! the conversation hold a receiver, and publishing a message fans it out to
//! every connected subscriber. Channels live only as long as they have
//! subscribers or pending messages; history is served over REST, and ordering
//! across reconnects is not guaranteed.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ChatMessage;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Joined { conversation_id: Uuid },
    Message { message: ChatMessage },
    Error { message: String },
}

#[derive(Clone, Default)]
pub struct ChatHub {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<ChatEvent>>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a conversation's channel, creating it on first join.
    pub async fn subscribe(&self, conversation_id: Uuid) -> broadcast::Receiver<ChatEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Fan an event out to the conversation's subscribers, if any. A channel
    /// whose last subscriber is gone is pruned on the next publish.
    pub async fn publish(&self, conversation_id: Uuid, event: ChatEvent) {
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&conversation_id) {
                Some(tx) => tx.send(event).is_ok(),
                None => return,
            }
        };

        if !delivered {
            let mut channels = self.channels.write().await;
            if channels
                .get(&conversation_id)
                .is_some_and(|tx| tx.receiver_count() == 0)
            {
                channels.remove(&conversation_id);
            }
        }
    }
}
