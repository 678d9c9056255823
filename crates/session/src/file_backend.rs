//! File-based session store — one JSON document per session.
//!
//! Storage location: `<root>/<session>.json`, where the session id is
//! sanitized into a safe file name. State is loaded from disk on `get` and
//! flushed on every `put`/`reset`, so sessions survive process restarts.
//! Simple, portable, human-inspectable.

use async_trait::async_trait;
use docfox_core::error::SessionError;
use docfox_core::message::{SessionId, SessionState};
use docfox_core::session::SessionStore;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A file-backed session store.
pub struct FileSessionStore {
    root: PathBuf,
    // Serializes get/put/reset so interleaved writers cannot corrupt a file.
    io_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            io_lock: Mutex::new(()),
        }
    }

    /// Default root: `~/.docfox/sessions/`
    pub fn default_root() -> PathBuf {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".docfox").join("sessions")
    }

    fn session_path(&self, id: &SessionId) -> PathBuf {
        // Session ids come from callers; keep only filename-safe characters.
        let safe: String = id
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }

    fn load_from_disk(&self, id: &SessionId) -> SessionState {
        let path = self.session_path(id);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return SessionState::new(), // First access — start empty
        };

        match serde_json::from_str::<SessionState>(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Discarding corrupted session file");
                SessionState::new()
            }
        }
    }

    fn flush(&self, id: &SessionId, state: &SessionState) -> Result<(), SessionError> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| SessionError::Storage(format!("Failed to create session dir: {e}")))?;

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| SessionError::Storage(format!("Failed to serialize session: {e}")))?;

        let path = self.session_path(id);
        std::fs::write(&path, content)
            .map_err(|e| SessionError::Storage(format!("Failed to write session file: {e}")))?;

        debug!(path = %path.display(), messages = state.history.len(), "Session flushed");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, id: &SessionId) -> Result<SessionState, SessionError> {
        let _guard = self.io_lock.lock().await;
        Ok(self.load_from_disk(id))
    }

    async fn put(&self, id: &SessionId, state: SessionState) -> Result<(), SessionError> {
        let _guard = self.io_lock.lock().await;
        self.flush(id, &state)
    }

    async fn reset(&self, id: &SessionId) -> Result<(), SessionError> {
        let _guard = self.io_lock.lock().await;
        self.flush(id, &SessionState::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfox_core::message::Message;

    #[tokio::test]
    async fn missing_file_yields_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf());

        let state = store.get(&SessionId::from("nobody")).await.unwrap();
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn put_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let id = SessionId::from("durable");

        {
            let store = FileSessionStore::new(dir.path().to_path_buf());
            let mut state = SessionState::new();
            state.history.push(Message::user("remember me"));
            state.summary.append("a digest");
            store.put(&id, state).await.unwrap();
        }

        let store = FileSessionStore::new(dir.path().to_path_buf());
        let loaded = store.get(&id).await.unwrap();
        assert_eq!(loaded.history.len(), 1);
        assert_eq!(loaded.history[0].content, "remember me");
        assert_eq!(loaded.summary.segment_count(), 1);
    }

    #[tokio::test]
    async fn reset_truncates_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf());
        let id = SessionId::from("s1");

        let mut state = SessionState::new();
        state.history.push(Message::user("hello"));
        store.put(&id, state).await.unwrap();

        store.reset(&id).await.unwrap();
        let loaded = store.get(&id).await.unwrap();
        assert!(loaded.history.is_empty());
        assert!(loaded.summary.is_empty());
    }

    #[tokio::test]
    async fn corrupted_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();

        let store = FileSessionStore::new(dir.path().to_path_buf());
        let state = store.get(&SessionId::from("bad")).await.unwrap();
        assert!(state.history.is_empty());
    }

    #[tokio::test]
    async fn session_id_sanitized_into_filename() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().to_path_buf());
        let id = SessionId::from("../evil/../../id");

        store.put(&id, SessionState::new()).await.unwrap();

        // Everything stays under the root directory.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
