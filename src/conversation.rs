//! Session identity and the conversation log.
//!
//! DESIGN
//! ======
//! A [`SessionId`] is generated once per widget mount and sent with every
//! chat request; it is never persisted and never regenerated while mounted.
//! [`ConversationLog`] holds the session's messages in append order and does
//! no I/O. Clearing empties the log without starting a new session, and the
//! message id counter keeps running across a clear so list identities are
//! never reused within the session.

#[cfg(test)]
#[path = "conversation_test.rs"]
mod conversation_test;

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Correlation token for one widget mount. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh, unique session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("session-{}", uuid::Uuid::new_v4()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Strictly increasing within a session; list identity only.
    pub id: u64,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Set only on synthetic assistant fallbacks.
    pub is_error: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// Draft of a message before the log assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub role: Role,
    pub content: String,
    pub is_error: bool,
    pub context: Option<serde_json::Value>,
}

impl NewMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), is_error: false, context: None }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>, context: Option<serde_json::Value>) -> Self {
        Self { role: Role::Assistant, content: content.into(), is_error: false, context }
    }

    #[must_use]
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), is_error: true, context: None }
    }
}

/// Append-only, session-scoped message sequence.
///
/// `clear` empties the sequence but keeps the id counter running, so ids
/// stay strictly increasing for the whole session.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    next_id: u64,
}

impl ConversationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `draft` and return the id it was assigned.
    pub fn append(&mut self, draft: NewMessage) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(Message {
            id,
            role: draft.role,
            content: draft.content,
            timestamp: now_ms(),
            is_error: draft.is_error,
            context: draft.context,
        });
        id
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}
