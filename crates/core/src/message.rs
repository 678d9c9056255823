//! Message and session domain types.
//!
//! These are the core value objects that flow through the system:
//! user sends a message → turn controller processes it → model generates a
//! response, possibly requesting capabilities → results fold back into the
//! conversation → session store persists the committed history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capability::CapabilityCall;

/// Unique identifier for a session (one conversation thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
///
/// Exhaustive sum type — every inspection site matches all four variants so
/// an unhandled role cannot slip through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Policy, rolling summary, and hint messages
    System,
    /// The end user
    User,
    /// The model
    Assistant,
    /// Output of a capability invocation
    #[serde(rename = "capability_result")]
    CapabilityResult,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content (may be empty for pure capability-call messages)
    pub content: String,

    /// Capability invocations requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_calls: Vec<CapabilityCall>,

    /// For capability-result messages: which capability produced this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability_name: Option<String>,

    /// For capability-result messages: the call this result answers
    /// (provider-level correlation id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::System,
            content: content.into(),
            capability_calls: Vec::new(),
            capability_name: None,
            call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            capability_calls: Vec::new(),
            capability_name: None,
            call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            capability_calls: Vec::new(),
            capability_name: None,
            call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a capability-result message.
    ///
    /// Invariant: a capability-result is always preceded somewhere earlier in
    /// the sequence by an assistant message whose `capability_calls` included
    /// a matching name — result messages never appear spontaneously.
    pub fn capability_result(
        capability_name: impl Into<String>,
        call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::CapabilityResult,
            content: content.into(),
            capability_calls: Vec::new(),
            capability_name: Some(capability_name.into()),
            call_id: Some(call_id.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Accumulated digest of history removed from the live window.
///
/// Segments are only ever appended (one per compression) or cleared on an
/// explicit session reset — never replaced wholesale, so information from
/// earlier compressions is not silently lost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingSummary {
    segments: Vec<String>,
}

impl RollingSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one digest segment.
    pub fn append(&mut self, delta: impl Into<String>) {
        self.segments.push(delta.into());
    }

    /// Render all segments, newline-joined, for prompt injection.
    pub fn render(&self) -> String {
        self.segments.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of appended segments (monotonically non-decreasing between resets).
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

/// The per-session state the store persists: committed history plus the
/// rolling summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Ordered, append-only message sequence (prefix-truncated only during
    /// compression, with the removed prefix folded into `summary`)
    pub history: Vec<Message>,

    /// Digest of compressed-away history
    pub summary: RollingSummary,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello!");
        assert!(msg.capability_calls.is_empty());
        assert!(msg.capability_name.is_none());
    }

    #[test]
    fn capability_result_carries_name() {
        let msg = Message::capability_result("web_search", "call_1", "results...");
        assert_eq!(msg.role, Role::CapabilityResult);
        assert_eq!(msg.capability_name.as_deref(), Some("web_search"));
        assert_eq!(msg.call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::capability_result("save_text", "call_2", "{}");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("capability_result"));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::CapabilityResult);
        assert_eq!(back.capability_name.as_deref(), Some("save_text"));
    }

    #[test]
    fn rolling_summary_appends_never_replaces() {
        let mut summary = RollingSummary::new();
        assert!(summary.is_empty());

        summary.append("first digest");
        summary.append("second digest");
        assert_eq!(summary.segment_count(), 2);
        assert_eq!(summary.render(), "first digest\nsecond digest");
    }

    #[test]
    fn rolling_summary_clear_on_reset() {
        let mut summary = RollingSummary::new();
        summary.append("digest");
        summary.clear();
        assert!(summary.is_empty());
        assert_eq!(summary.segment_count(), 0);
    }
}
