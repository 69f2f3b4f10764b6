//! Session state
//!
//! A session is the conversational context scoped to one key, spanning many
//! turns. History is append-only: completed turns are pushed and never
//! rewritten, so an abandoned turn cannot corrupt what earlier turns
//! committed.

use std::collections::HashMap;

use crate::llm::Message;

/// One conversation's accumulated context
#[derive(Debug, Default)]
pub struct Session {
    key: String,
    history: Vec<Message>,
}

impl Session {
    /// Create an empty session for a key
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            history: Vec::new(),
        }
    }

    /// The session key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The ordered history so far
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Append a completed turn record
    pub fn push(&mut self, message: Message) {
        self.history.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

/// Holds sessions by key, creating each on first use
///
/// Owned exclusively by the orchestrator; sessions are handed out by
/// mutable reference, never shared across turns concurrently.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for a key, creating it on first use
    pub fn session_mut(&mut self, key: &str) -> &mut Session {
        self.sessions
            .entry(key.to_string())
            .or_insert_with(|| Session::new(key))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
