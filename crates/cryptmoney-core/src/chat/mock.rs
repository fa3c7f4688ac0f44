//! Mock Chat Client
//!
//! Records every posted message and replays scripted event batches.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatClient, ChatEvent, OutgoingMessage, same_channel};
use crate::error::{BotError, Result};

/// In-memory chat backend
#[derive(Default)]
pub struct MockChatClient {
    posted: Mutex<Vec<OutgoingMessage>>,
    batches: Mutex<VecDeque<Vec<ChatEvent>>>,
    connected: Mutex<bool>,
    channel_ids: HashMap<String, String>,
    refuse_connection: bool,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose realtime connection always fails
    pub fn unreachable() -> Self {
        Self {
            refuse_connection: true,
            ..Self::default()
        }
    }

    /// Queue a batch of events for `read_events`
    #[must_use]
    pub fn with_events(self, events: Vec<ChatEvent>) -> Self {
        if let Ok(mut batches) = self.batches.lock() {
            batches.push_back(events);
        }
        self
    }

    /// Report `id` as the stream identifier of channel `name`
    #[must_use]
    pub fn with_channel_id(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.channel_ids.insert(name.into(), id.into());
        self
    }

    /// Everything posted so far
    pub fn posted(&self) -> Vec<OutgoingMessage> {
        self.posted.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.lock().map(|c| *c).unwrap_or(false)
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn post_message(&self, message: &OutgoingMessage) -> Result<()> {
        self.posted
            .lock()
            .map_err(|_| BotError::Chat("mock chat lock poisoned".into()))?
            .push(message.clone());
        Ok(())
    }

    async fn connect_realtime(&self) -> Result<()> {
        if self.refuse_connection {
            return Err(BotError::RealtimeConnect("mock backend refuses connections".into()));
        }
        let mut connected = self
            .connected
            .lock()
            .map_err(|_| BotError::Chat("mock chat lock poisoned".into()))?;
        *connected = true;
        Ok(())
    }

    async fn resolve_channel(&self, channel: &str) -> Result<String> {
        Ok(self
            .channel_ids
            .iter()
            .find(|(name, _)| same_channel(name, channel))
            .map_or_else(|| channel.to_string(), |(_, id)| id.clone()))
    }

    async fn read_events(&self) -> Result<Vec<ChatEvent>> {
        if !self.is_connected() {
            return Err(BotError::Disconnected("not connected".into()));
        }
        self.batches
            .lock()
            .map_err(|_| BotError::Chat("mock chat lock poisoned".into()))?
            .pop_front()
            .ok_or_else(|| BotError::Disconnected("event script exhausted".into()))
    }

    fn name(&self) -> &str {
        "MockChat"
    }
}
