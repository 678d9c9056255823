//! History summarizer — folds an overflowing history prefix into a digest.
//!
//! When the window manager reports an excess prefix, that prefix is sent to
//! the summarization collaborator behind a fixed compression instruction.
//! On failure the prefix is still dropped, just without a digest: the turn
//! must not fail because summarization did. Policy: availability wins over
//! memory fidelity.

use docfox_core::message::Message;
use docfox_core::model::{ModelClient, ModelRequest, Summarizer};
use docfox_core::error::ModelError;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::window;

/// Fixed instruction prepended to the prefix sent for compression.
pub const COMPRESSION_INSTRUCTION: &str = "Produce a 4-5 line factual digest of the conversation \
below: topic, conclusions, decisions, and key code/version/URL references. Omit redundancy. \
Flag anything uncertain.";

/// Compress `history` if it exceeds the window for `max_turns`.
///
/// Returns the retained suffix and, on summarization success, the digest to
/// append to the session's rolling summary. Within bound, the history comes
/// back untouched with no delta.
pub async fn maybe_compress(
    history: Vec<Message>,
    max_turns: usize,
    summarizer: &dyn Summarizer,
) -> (Vec<Message>, Option<String>) {
    let dropped = window::excess_prefix(&history, max_turns).len();
    if dropped == 0 {
        return (history, None);
    }

    let mut prefix = Vec::with_capacity(dropped + 1);
    prefix.push(Message::system(COMPRESSION_INSTRUCTION));
    prefix.extend_from_slice(&history[..dropped]);

    let suffix = window::trim(&history, max_turns).to_vec();

    match summarizer.summarize(&prefix).await {
        Ok(digest) => {
            debug!(dropped, "History prefix compressed into summary");
            (suffix, Some(digest))
        }
        Err(e) => {
            warn!(error = %e, dropped, "Summarization failed; dropping prefix without digest");
            (suffix, None)
        }
    }
}

/// A `Summarizer` over any `ModelClient`, run at temperature 0 for
/// low-variability digests.
pub struct ModelSummarizer {
    model: Arc<dyn ModelClient>,
    model_name: String,
}

impl ModelSummarizer {
    pub fn new(model: Arc<dyn ModelClient>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }
}

#[async_trait::async_trait]
impl Summarizer for ModelSummarizer {
    async fn summarize(&self, messages: &[Message]) -> Result<String, ModelError> {
        let request = ModelRequest {
            model: self.model_name.clone(),
            messages: messages.to_vec(),
            temperature: 0.0,
            max_tokens: Some(300),
            capabilities: vec![],
        };
        let response = self.model.complete(request).await?;
        Ok(response.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfox_core::error::ModelError;
    use docfox_core::model::{ModelResponse, Usage};

    struct FixedSummarizer;

    #[async_trait::async_trait]
    impl Summarizer for FixedSummarizer {
        async fn summarize(&self, messages: &[Message]) -> Result<String, ModelError> {
            // The compression instruction must lead the prefix.
            assert_eq!(messages[0].content, COMPRESSION_INSTRUCTION);
            Ok(format!("digest of {} messages", messages.len() - 1))
        }
    }

    struct BrokenSummarizer;

    #[async_trait::async_trait]
    impl Summarizer for BrokenSummarizer {
        async fn summarize(&self, _messages: &[Message]) -> Result<String, ModelError> {
            Err(ModelError::Timeout("summarizer deadline".into()))
        }
    }

    fn history(len: usize) -> Vec<Message> {
        (0..len)
            .map(|i| Message::user(format!("message {i}")))
            .collect()
    }

    #[tokio::test]
    async fn within_bound_is_untouched() {
        let h = history(10);
        let (kept, delta) = maybe_compress(h, 6, &FixedSummarizer).await;
        assert_eq!(kept.len(), 10);
        assert!(delta.is_none());
    }

    #[tokio::test]
    async fn over_bound_compresses_prefix() {
        let h = history(20);
        let (kept, delta) = maybe_compress(h, 6, &FixedSummarizer).await;
        assert_eq!(kept.len(), 14);
        assert_eq!(kept[0].content, "message 6");
        assert_eq!(delta.as_deref(), Some("digest of 6 messages"));
    }

    #[tokio::test]
    async fn summarizer_failure_still_truncates() {
        let h = history(20);
        let (kept, delta) = maybe_compress(h, 6, &BrokenSummarizer).await;
        // Same truncation as the success path, just no digest.
        assert_eq!(kept.len(), 14);
        assert_eq!(kept[0].content, "message 6");
        assert!(delta.is_none());
    }

    #[tokio::test]
    async fn model_summarizer_runs_at_temperature_zero() {
        struct CapturingModel;

        #[async_trait::async_trait]
        impl ModelClient for CapturingModel {
            fn name(&self) -> &str {
                "capturing"
            }
            async fn complete(
                &self,
                request: ModelRequest,
            ) -> Result<ModelResponse, ModelError> {
                assert_eq!(request.temperature, 0.0);
                assert!(request.capabilities.is_empty());
                Ok(ModelResponse {
                    message: Message::assistant("the digest"),
                    usage: Some(Usage {
                        prompt_tokens: 10,
                        completion_tokens: 5,
                        total_tokens: 15,
                    }),
                    model: request.model,
                })
            }
        }

        let summarizer = ModelSummarizer::new(Arc::new(CapturingModel), "gpt-4.1-mini");
        let digest = summarizer.summarize(&history(3)).await.unwrap();
        assert_eq!(digest, "the digest");
    }
}
