//! In-memory conversation sessions.
//!
//! One session per websocket connection. Sessions are created when the
//! connection is accepted, mutated only by that connection's task, and
//! removed on disconnect. Nothing here survives a restart.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::types::{AppError, ConversationSession, Result, Turn};

/// Registry of live conversations, keyed by session id.
///
/// Shared across the gateway and the read-only inspection endpoints via
/// `Arc`. The lock is held only for map access, never across await points.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, ConversationSession>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and return its id.
    pub fn create(&self) -> String {
        let session = ConversationSession {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now(),
            history: Vec::new(),
        };
        let id = session.id.clone();
        self.sessions.write().insert(id.clone(), session);
        debug!(session_id = %id, "Session created");
        id
    }

    /// Append a turn to a session's history.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the session does not exist (e.g.
    /// it was already removed on disconnect).
    pub fn append(&self, id: &str, turn: Turn) -> Result<()> {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
        session.history.push(turn);
        Ok(())
    }

    /// Snapshot of a session's ordered history.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown ids.
    pub fn history(&self, id: &str) -> Result<Vec<Turn>> {
        self.sessions
            .read()
            .get(id)
            .map(|s| s.history.clone())
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
    }

    /// Snapshot of a full session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown ids.
    pub fn get(&self, id: &str) -> Result<ConversationSession> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("session {}", id)))
    }

    /// Ids of all live sessions, in no particular order.
    pub fn active_ids(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Remove a session. Removing an unknown id is a no-op; disconnect
    /// handling must not fail.
    pub fn remove(&self, id: &str) {
        if self.sessions.write().remove(id).is_some() {
            debug!(session_id = %id, "Session removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_append() {
        let store = SessionStore::new();
        let id = store.create();

        store.append(&id, Turn::user("what is Move?")).unwrap();
        store.append(&id, Turn::bot("Move is a language.")).unwrap();

        let history = store.history(&id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "what is Move?");
        assert_eq!(history[1].text, "Move is a language.");
    }

    #[test]
    fn test_ids_are_unique() {
        let store = SessionStore::new();
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let store = SessionStore::new();
        assert!(matches!(
            store.history("nope"),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.append("nope", Turn::user("hi")),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = SessionStore::new();
        let id = store.create();
        store.remove(&id);
        store.remove(&id);
        assert!(store.is_empty());
        assert!(store.history(&id).is_err());
    }

    #[test]
    fn test_active_ids_lists_live_sessions() {
        let store = SessionStore::new();
        let a = store.create();
        let b = store.create();
        store.remove(&a);

        let ids = store.active_ids();
        assert_eq!(ids, vec![b]);
    }
}
