//! # docfox Core
//!
//! Domain types, traits, and error definitions for the docfox agent.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator the turn controller talks to (model, summarizer,
//! capabilities, session store) is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub collaborators
//! - Clean dependency graph (all crates depend inward on core)

pub mod capability;
pub mod error;
pub mod message;
pub mod model;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use capability::{
    Capability, CapabilityCall, CapabilityDefinition, CapabilityOutput, CapabilityRegistry,
    CapabilitySpec,
};
pub use error::{CapabilityError, Error, ModelError, Result, SessionError};
pub use message::{Message, Role, RollingSummary, SessionId, SessionState};
pub use model::{ModelClient, ModelRequest, ModelResponse, Summarizer, Usage};
pub use session::SessionStore;
