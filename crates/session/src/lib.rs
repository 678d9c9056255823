//! Session store implementations for docfox.
//!
//! The `SessionStore` trait lives in `docfox-core`; this crate provides the
//! backends: an in-memory map for tests and ephemeral use, and a JSON-file
//! store for state that survives process restarts.

pub mod file_backend;
pub mod in_memory;

pub use file_backend::FileSessionStore;
pub use in_memory::InMemorySessionStore;
