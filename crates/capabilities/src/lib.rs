//! Built-in capability implementations for docfox.
//!
//! Capabilities are the external actions the model may request during a
//! turn: search the web for official documentation, retrieve snippets from
//! the local document corpus, persist an answer to a text file, or post a
//! chat notification.

pub mod notify_chat;
pub mod retrieval;
pub mod save_text;
pub mod web_search;

pub use notify_chat::{NotifyChatCapability, NotifyConfig};
pub use retrieval::{DocRetrievalCapability, SnippetIndex};
pub use save_text::SaveTextCapability;
pub use web_search::WebSearchCapability;

use docfox_core::capability::CapabilityRegistry;
use std::path::PathBuf;

/// Configuration for the built-in capability set.
#[derive(Debug, Clone)]
pub struct CapabilitiesConfig {
    /// Directory where save_text writes its .txt files.
    pub save_dir: PathBuf,
    /// Directory holding the local document corpus for retrieval.
    pub docs_dir: PathBuf,
    /// Chat notification settings.
    pub notify: NotifyConfig,
}

/// Create a registry with all built-in capabilities.
pub fn default_registry(config: &CapabilitiesConfig) -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry.register(Box::new(WebSearchCapability));
    registry.register(Box::new(DocRetrievalCapability::new(SnippetIndex::load(
        &config.docs_dir,
    ))));
    registry.register(Box::new(SaveTextCapability::new(config.save_dir.clone())));
    registry.register(Box::new(NotifyChatCapability::new(config.notify.clone())));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        let config = CapabilitiesConfig {
            save_dir: dir.path().join("out"),
            docs_dir: dir.path().join("docs"),
            notify: NotifyConfig::default(),
        };

        let registry = default_registry(&config);
        let mut names = registry.names();
        names.sort();
        assert_eq!(
            names,
            vec!["doc_retrieval", "notify_chat", "save_text", "web_search"]
        );
    }

    #[test]
    fn only_save_text_is_once_per_turn() {
        let dir = tempfile::tempdir().unwrap();
        let config = CapabilitiesConfig {
            save_dir: dir.path().join("out"),
            docs_dir: dir.path().join("docs"),
            notify: NotifyConfig::default(),
        };

        let registry = default_registry(&config);
        assert!(registry.resolve_spec("save_text").unwrap().once_per_turn);
        assert!(!registry.resolve_spec("web_search").unwrap().once_per_turn);
        assert!(!registry.resolve_spec("doc_retrieval").unwrap().once_per_turn);
        assert!(!registry.resolve_spec("notify_chat").unwrap().once_per_turn);
    }
}
