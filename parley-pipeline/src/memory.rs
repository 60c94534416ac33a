//! In-process collaborators for tests and single-node setups.

use crate::error::{PipelineError, PipelineResult};
use crate::message::{ChatMessage, MessageStore, TranslationStatusUpdate};
use crate::notifier::{RoomMembership, TranslationEvent, TranslationNotifier};
use async_trait::async_trait;
use parking_lot::Mutex;
use parley_queue::MessageId;
use std::collections::{HashMap, HashSet};

/// Message store held in a map. Records every update it applies.
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: Mutex<HashMap<MessageId, ChatMessage>>,
    updates: Mutex<Vec<TranslationStatusUpdate>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, message: ChatMessage) {
        self.messages.lock().insert(message.id.clone(), message);
    }

    pub fn get(&self, id: &MessageId) -> Option<ChatMessage> {
        self.messages.lock().get(id).cloned()
    }

    /// Updates applied so far, oldest first.
    pub fn updates(&self) -> Vec<TranslationStatusUpdate> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn get_message(&self, id: &MessageId) -> PipelineResult<Option<ChatMessage>> {
        Ok(self.get(id))
    }

    async fn update_translation_status(
        &self,
        update: TranslationStatusUpdate,
    ) -> PipelineResult<ChatMessage> {
        let mut messages = self.messages.lock();
        let message = messages
            .get_mut(&update.message_id)
            .ok_or_else(|| PipelineError::Store(format!("message {} not found", update.message_id)))?;

        update.apply_to(message);
        let updated = message.clone();
        drop(messages);

        self.updates.lock().push(update);
        Ok(updated)
    }
}

/// Notifier that keeps every event it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<(String, TranslationEvent)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(room, event)` pairs in send order.
    pub fn events(&self) -> Vec<(String, TranslationEvent)> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl TranslationNotifier for RecordingNotifier {
    async fn notify_room(&self, room_name: &str, event: &TranslationEvent) -> PipelineResult<()> {
        self.events
            .lock()
            .push((room_name.to_string(), event.clone()));
        Ok(())
    }
}

/// Fixed set of `(user, room)` memberships.
#[derive(Default)]
pub struct StaticMembership {
    members: Mutex<HashSet<(String, String)>>,
}

impl StaticMembership {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, user_id: impl Into<String>, room_name: impl Into<String>) {
        self.members.lock().insert((user_id.into(), room_name.into()));
    }
}

#[async_trait]
impl RoomMembership for StaticMembership {
    async fn is_member(&self, user_id: &str, room_name: &str) -> PipelineResult<bool> {
        Ok(self
            .members
            .lock()
            .contains(&(user_id.to_string(), room_name.to_string())))
    }
}
