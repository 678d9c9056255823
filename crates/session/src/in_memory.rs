//! In-memory session store — the default for tests and ephemeral sessions.

use async_trait::async_trait;
use docfox_core::error::SessionError;
use docfox_core::message::{SessionId, SessionState};
use docfox_core::session::SessionStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory store mapping session ids to their state.
///
/// State lives only for the process lifetime. `get`/`put`/`reset` are
/// serialized by the lock; there is no cross-turn coordination for a single
/// session id beyond last-put-wins.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionState>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of sessions currently held.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn get(&self, id: &SessionId) -> Result<SessionState, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned().unwrap_or_default())
    }

    async fn put(&self, id: &SessionId, state: SessionState) -> Result<(), SessionError> {
        self.sessions.write().await.insert(id.clone(), state);
        Ok(())
    }

    async fn reset(&self, id: &SessionId) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .insert(id.clone(), SessionState::new());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfox_core::message::Message;

    #[tokio::test]
    async fn first_access_creates_empty() {
        let store = InMemorySessionStore::new();
        let id = SessionId::from("fresh");

        let state = store.get(&id).await.unwrap();
        assert!(state.history.is_empty());
        assert!(state.summary.is_empty());
    }

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let store = InMemorySessionStore::new();
        let id = SessionId::from("s1");

        let mut state = SessionState::new();
        state.history.push(Message::user("hello"));
        state.summary.append("a digest");
        store.put(&id, state).await.unwrap();

        let loaded = store.get(&id).await.unwrap();
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.summary.segment_count(), 1);
    }

    #[tokio::test]
    async fn last_put_wins() {
        let store = InMemorySessionStore::new();
        let id = SessionId::from("s1");

        let mut first = SessionState::new();
        first.history.push(Message::user("first"));
        store.put(&id, first).await.unwrap();

        let mut second = SessionState::new();
        second.history.push(Message::user("second"));
        second.history.push(Message::assistant("reply"));
        store.put(&id, second).await.unwrap();

        let loaded = store.get(&id).await.unwrap();
        assert_eq!(loaded.history.len(), 2);
        assert_eq!(loaded.history[0].content, "second");
    }

    #[tokio::test]
    async fn reset_clears_history_and_summary() {
        let store = InMemorySessionStore::new();
        let id = SessionId::from("s1");

        let mut state = SessionState::new();
        state.history.push(Message::user("hello"));
        state.summary.append("a digest");
        store.put(&id, state).await.unwrap();

        store.reset(&id).await.unwrap();
        let loaded = store.get(&id).await.unwrap();
        assert!(loaded.history.is_empty());
        assert!(loaded.summary.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemorySessionStore::new();

        let mut a = SessionState::new();
        a.history.push(Message::user("for a"));
        store.put(&SessionId::from("a"), a).await.unwrap();

        let b = store.get(&SessionId::from("b")).await.unwrap();
        assert!(b.history.is_empty());
        assert_eq!(store.session_count().await, 1);
    }
}
