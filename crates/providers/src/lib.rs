//! Model client implementations for docfox.
//!
//! One implementation covers the vast majority of hosted models: the
//! OpenAI-compatible `/v1/chat/completions` surface (OpenAI, OpenRouter,
//! Ollama, vLLM, and friends).

pub mod openai_compat;

pub use openai_compat::OpenAiCompatClient;
