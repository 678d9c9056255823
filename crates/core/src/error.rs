//! Error types for the docfox domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own error enum, folded into the top-level `Error`.
//!
//! Fault policy: capability faults (including unknown-capability routing
//! faults) are recovered into the conversation as error result messages so
//! the model can react; model and session faults are fatal to the turn and
//! propagate upward verbatim. Summarization faults degrade gracefully and
//! never abort a turn.

use thiserror::Error;

/// The top-level error type for all docfox operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model errors ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Capability errors ---
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("API request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Routing fault: the model requested a capability that does not exist.
    #[error("Unknown capability: {0}")]
    Unknown(String),

    #[error("Invalid capability arguments: {0}")]
    InvalidArguments(String),

    #[error("Capability failed: {name} — {reason}")]
    Failed { name: String, reason: String },

    #[error("Capability timed out: {name} after {timeout_secs}s")]
    Timeout { name: String, timeout_secs: u64 },

    /// An at-most-once-per-turn capability was requested again after a
    /// successful invocation in the same turn.
    #[error("Capability already invoked this turn: {0}")]
    AlreadyInvoked(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}
