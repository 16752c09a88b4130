use chefbot_core::{Id, Message, Metadata, Role, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub message_count: usize,
    pub tool_call_count: usize,
    pub iteration_count: usize,
}

#[derive(Debug, Default)]
struct SessionInner {
    messages: Vec<Message>,
    stats: SessionStats,
}

/// Conversation state shared by every clone of the session.
#[derive(Clone, Debug)]
pub struct Session {
    id: Id,
    created_at: Timestamp,
    metadata: Metadata,
    inner: Arc<RwLock<SessionInner>>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(Id::new())
    }

    pub fn with_id(id: Id) -> Self {
        Self {
            id,
            created_at: Timestamp::now(),
            metadata: Metadata::new(),
            inner: Arc::new(RwLock::new(SessionInner::default())),
        }
    }

    pub fn with_metadata<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn add_message(&self, message: Message) {
        let mut inner = self.write();
        inner.stats.message_count += 1;
        inner.messages.push(message);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.read().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.read().messages.len()
    }

    /// The most recent `n` messages. Tool results whose call was cut off by
    /// the window are skipped so the context never opens on an orphan result.
    pub fn last_messages(&self, n: usize) -> Vec<Message> {
        let inner = self.read();
        let len = inner.messages.len();
        let start = len.saturating_sub(n);
        inner.messages[start..]
            .iter()
            .skip_while(|m| m.role == Role::Tool)
            .cloned()
            .collect()
    }

    pub fn last_assistant_text(&self) -> Option<String> {
        self.read()
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && !m.has_tool_use())
            .map(Message::text_content)
    }

    /// Forgets the conversation and its counters.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.messages.clear();
        inner.stats = SessionStats::default();
    }

    pub fn stats(&self) -> SessionStats {
        self.read().stats.clone()
    }

    pub fn increment_tool_calls(&self, count: usize) {
        self.write().stats.tool_call_count += count;
    }

    pub fn increment_iterations(&self) {
        self.write().stats.iteration_count += 1;
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
