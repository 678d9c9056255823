//! Session store trait — per-session conversation state.
//!
//! A session binds a session id to one conversation history and one rolling
//! summary. The store is the only shared mutable resource in the core:
//! implementations serialize `get`/`put`/`reset` per backend, while
//! cross-turn serialization for a single session id remains the caller's
//! responsibility (last `put` wins).

use async_trait::async_trait;

use crate::error::SessionError;
use crate::message::{SessionId, SessionState};

/// The session store contract.
///
/// Implementations: in-memory (tests/dev), file-backed (durable).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Load the state for a session, creating an empty one on first access.
    async fn get(&self, id: &SessionId) -> std::result::Result<SessionState, SessionError>;

    /// Persist the state for a session. Last writer wins.
    async fn put(
        &self,
        id: &SessionId,
        state: SessionState,
    ) -> std::result::Result<(), SessionError>;

    /// Reset a session to the empty state (empty history, empty summary).
    async fn reset(&self, id: &SessionId) -> std::result::Result<(), SessionError>;
}
