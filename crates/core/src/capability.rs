//! Capability trait — the abstraction over external actions.
//!
//! Capabilities are what the model may request during a turn: web search,
//! local document retrieval, persisting text to a file, posting a chat
//! notification. Each one is registered in the `CapabilityRegistry` and
//! described to the model via its `CapabilityDefinition`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CapabilityError;

/// A request to invoke a capability, as emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityCall {
    /// Unique call ID (matches the model's tool_call id)
    pub id: String,

    /// Name of the capability to invoke
    pub name: String,

    /// Structured argument payload
    pub arguments: serde_json::Value,
}

/// The result of a capability invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityOutput {
    /// The call ID this output answers
    pub call_id: String,

    /// Whether the invocation succeeded
    pub success: bool,

    /// The output content, as shown to the model
    pub output: String,

    /// Optional structured payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// A capability definition sent to the model so it knows what it can request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the capability's arguments
    pub parameters: serde_json::Value,
}

/// Invocation policy for a capability, consulted by the turn controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySpec {
    /// Safe to retry with the same arguments
    pub idempotent: bool,

    /// Restricted to at most one successful invocation per turn
    /// (true for the persistence capability)
    pub once_per_turn: bool,
}

impl CapabilitySpec {
    /// A read-only capability: retryable, no per-turn restriction.
    pub const fn read_only() -> Self {
        Self {
            idempotent: true,
            once_per_turn: false,
        }
    }

    /// A side-effecting capability restricted to one success per turn.
    pub const fn once_per_turn() -> Self {
        Self {
            idempotent: false,
            once_per_turn: true,
        }
    }
}

/// The core Capability trait.
///
/// Each capability (web_search, doc_retrieval, save_text, notify_chat)
/// implements this trait and is registered in the `CapabilityRegistry`.
#[async_trait]
pub trait Capability: Send + Sync {
    /// The unique name of this capability (e.g., "web_search").
    fn name(&self) -> &str;

    /// A description of what this capability does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this capability's arguments.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Invocation policy for this capability.
    fn spec(&self) -> CapabilitySpec {
        CapabilitySpec::read_only()
    }

    /// Invoke the capability with the given arguments.
    async fn invoke(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CapabilityOutput, CapabilityError>;

    /// Convert this capability into a definition for the model.
    fn definition(&self) -> CapabilityDefinition {
        CapabilityDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available capabilities.
///
/// The turn controller uses this to:
/// 1. Get capability definitions to send to the model
/// 2. Resolve and invoke capabilities when the model requests them
/// 3. Consult per-capability invocation policy (`CapabilitySpec`)
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Box<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            capabilities: HashMap::new(),
        }
    }

    /// Register a capability. Replaces any existing one with the same name.
    pub fn register(&mut self, capability: Box<dyn Capability>) {
        let name = capability.name().to_string();
        self.capabilities.insert(name, capability);
    }

    /// Resolve a capability by name.
    pub fn get(&self, name: &str) -> Option<&dyn Capability> {
        self.capabilities.get(name).map(|c| c.as_ref())
    }

    /// Resolve a capability's invocation policy, or a routing fault for an
    /// unknown name.
    pub fn resolve_spec(&self, name: &str) -> std::result::Result<CapabilitySpec, CapabilityError> {
        self.capabilities
            .get(name)
            .map(|c| c.spec())
            .ok_or_else(|| CapabilityError::Unknown(name.to_string()))
    }

    /// Get all capability definitions (for sending to the model).
    pub fn definitions(&self) -> Vec<CapabilityDefinition> {
        self.capabilities.values().map(|c| c.definition()).collect()
    }

    /// Invoke a capability call. Unknown names are a routing fault.
    pub async fn invoke(
        &self,
        call: &CapabilityCall,
    ) -> std::result::Result<CapabilityOutput, CapabilityError> {
        let capability = self
            .capabilities
            .get(&call.name)
            .ok_or_else(|| CapabilityError::Unknown(call.name.clone()))?;
        let mut output = capability.invoke(call.arguments.clone()).await?;
        output.call_id = call.id.clone();
        Ok(output)
    }

    /// List all registered capability names.
    pub fn names(&self) -> Vec<&str> {
        self.capabilities.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
