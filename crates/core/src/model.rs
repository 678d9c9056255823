//! Model collaborator traits — the abstraction over LLM backends.
//!
//! `ModelClient` sends a message sequence and gets one assistant message
//! back, optionally carrying requested capability invocations. `Summarizer`
//! compresses a history prefix into a short digest. The turn controller
//! depends on these contracts only, never on their implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capability::CapabilityDefinition;
use crate::error::ModelError;
use crate::message::Message;

/// A completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The model to use (e.g., "gpt-4.1-mini")
    pub model: String,

    /// The assembled message sequence
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Capabilities the model may request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<CapabilityDefinition>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Exactly one assistant message, possibly with capability_calls
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The model collaborator contract.
///
/// Timeouts are owned by the implementation (e.g., the HTTP client's request
/// timeout); on timeout `complete` returns `ModelError::Timeout` and the
/// turn aborts cleanly with canonical history untouched.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// A human-readable name for this client (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(
        &self,
        request: ModelRequest,
    ) -> std::result::Result<ModelResponse, ModelError>;
}

/// The summarization collaborator contract.
///
/// Given a history prefix (already prefixed with the compression
/// instruction by the caller), produce a short digest. Implementations are
/// expected to run at a low-variability configuration (temperature 0).
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, messages: &[Message]) -> std::result::Result<String, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let req = ModelRequest {
            model: "gpt-4.1-mini".into(),
            messages: vec![],
            temperature: default_temperature(),
            max_tokens: None,
            capabilities: vec![],
        };
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn capability_definition_serialization() {
        let def = CapabilityDefinition {
            name: "web_search".into(),
            description: "Search the web".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" }
                },
                "required": ["query"]
            }),
        };
        let json = serde_json::to_string(&def).unwrap();
        assert!(json.contains("web_search"));
        assert!(json.contains("query"));
    }
}
