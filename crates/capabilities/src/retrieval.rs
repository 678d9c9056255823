//! Document retrieval capability — keyword-scored search over a local
//! corpus of notes, examples, and source files.
//!
//! The index is built once at startup from a directory of text-like files
//! (markdown, plain text, Python, Rust, notebooks exported to text) split
//! into paragraph chunks. Scoring is term-frequency keyword matching;
//! swapping in a vector index only requires replacing `SnippetIndex`.

use async_trait::async_trait;
use docfox_core::capability::{Capability, CapabilityOutput};
use docfox_core::error::CapabilityError;
use std::path::Path;
use tracing::{debug, warn};

/// File extensions included in the corpus.
const INDEXED_EXTENSIONS: &[&str] = &["md", "txt", "py", "rs", "ipynb"];

/// Maximum characters per returned snippet.
const SNIPPET_MAX_CHARS: usize = 500;

/// One indexed chunk of a corpus file.
#[derive(Debug, Clone)]
struct Chunk {
    content: String,
    source: String,
}

/// A keyword-scored snippet index over a document directory.
pub struct SnippetIndex {
    chunks: Vec<Chunk>,
    loaded: bool,
}

impl SnippetIndex {
    /// Build an index from every supported file under `dir`.
    ///
    /// A missing directory yields an unloaded index; retrieval then reports
    /// the absence to the model instead of failing the invocation.
    pub fn load(dir: &Path) -> Self {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Document corpus directory not found");
            return Self {
                chunks: Vec::new(),
                loaded: false,
            };
        }

        let mut chunks = Vec::new();
        Self::collect(dir, dir, &mut chunks);
        debug!(dir = %dir.display(), chunks = chunks.len(), "Snippet index loaded");
        Self {
            chunks,
            loaded: true,
        }
    }

    /// An empty but "loaded" index, for tests.
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            loaded: true,
        }
    }

    fn collect(root: &Path, dir: &Path, chunks: &mut Vec<Chunk>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable corpus directory");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                Self::collect(root, &path, chunks);
                continue;
            }

            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default();
            if !INDEXED_EXTENSIONS.contains(&ext) {
                continue;
            }

            let text = match std::fs::read_to_string(&path) {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable corpus file");
                    continue;
                }
            };

            let source = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .display()
                .to_string();

            // Paragraph-level chunks; tiny fragments are noise.
            for paragraph in text.split("\n\n") {
                let trimmed = paragraph.trim();
                if trimmed.len() < 40 {
                    continue;
                }
                chunks.push(Chunk {
                    content: trimmed.to_string(),
                    source: source.clone(),
                });
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Return up to `k` snippets ranked by keyword overlap with `query`.
    pub fn search(&self, query: &str, k: usize) -> Vec<(String, String)> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(|t| t.to_string())
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, &Chunk)> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let haystack = chunk.content.to_lowercase();
                let occurrences: usize = terms.iter().map(|t| haystack.matches(t).count()).sum();
                if occurrences == 0 {
                    return None;
                }
                // Normalize by length so short focused chunks outrank walls of text.
                let score = occurrences as f32 / (chunk.content.len() as f32 / 100.0).max(1.0);
                Some((score, chunk))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| {
                let mut snippet = chunk.content.replace('\n', " ");
                if snippet.len() > SNIPPET_MAX_CHARS {
                    let mut cut = SNIPPET_MAX_CHARS;
                    while !snippet.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    snippet.truncate(cut);
                    snippet.push_str(" …");
                }
                (snippet, chunk.source.clone())
            })
            .collect()
    }
}

/// The retrieval capability exposed to the model.
pub struct DocRetrievalCapability {
    index: SnippetIndex,
}

impl DocRetrievalCapability {
    pub fn new(index: SnippetIndex) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Capability for DocRetrievalCapability {
    fn name(&self) -> &str {
        "doc_retrieval"
    }

    fn description(&self) -> &str {
        "Search the local document corpus (notes, examples, project files) and return relevant snippets with their sources. Use this when the question is covered by local material."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The information need to search for"
                },
                "k": {
                    "type": "integer",
                    "description": "Number of snippets to return (default 4)",
                    "default": 4
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(
        &self,
        arguments: serde_json::Value,
    ) -> Result<CapabilityOutput, CapabilityError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| CapabilityError::InvalidArguments("Missing 'query' argument".into()))?;

        let k = arguments["k"].as_u64().unwrap_or(4).clamp(1, 10) as usize;

        if !self.index.is_loaded() {
            return Ok(CapabilityOutput {
                call_id: String::new(),
                success: true,
                output: "Document index not found. Answer from general knowledge and say the local corpus is unavailable.".into(),
                data: None,
            });
        }

        let hits = self.index.search(query, k);
        if hits.is_empty() {
            return Ok(CapabilityOutput {
                call_id: String::new(),
                success: true,
                output: "No relevant passages found in the local documents.".into(),
                data: None,
            });
        }

        let lines: Vec<String> = hits
            .iter()
            .enumerate()
            .map(|(i, (snippet, source))| format!("{}. {}\n   [source] {}", i + 1, snippet, source))
            .collect();

        Ok(CapabilityOutput {
            call_id: String::new(),
            success: true,
            output: lines.join("\n"),
            data: Some(serde_json::json!(
                hits.iter()
                    .map(|(snippet, source)| serde_json::json!({
                        "snippet": snippet,
                        "source": source,
                    }))
                    .collect::<Vec<_>>()
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn index_loads_supported_files() {
        let dir = corpus_with(&[
            (
                "notes/pandas.md",
                "Merging dataframes in pandas uses the merge method with join keys.\n\nA second paragraph about concat and append operations in pandas.",
            ),
            ("ignore.bin", "binary stuff that should not be indexed at all"),
        ]);

        let index = SnippetIndex::load(dir.path());
        assert!(index.is_loaded());
        assert_eq!(index.chunk_count(), 2);
    }

    #[test]
    fn search_ranks_matching_chunks() {
        let dir = corpus_with(&[
            (
                "a.md",
                "pandas merge combines two dataframes on key columns. pandas merge is the main join tool.",
            ),
            (
                "b.md",
                "matplotlib draws charts and figures with the pyplot interface for plotting data.",
            ),
        ]);

        let index = SnippetIndex::load(dir.path());
        let hits = index.search("pandas merge", 4);
        assert!(!hits.is_empty());
        assert_eq!(hits[0].1, "a.md");
    }

    #[test]
    fn search_respects_k() {
        let dir = corpus_with(&[
            ("a.md", "rust ownership rules are enforced by the borrow checker in rust programs."),
            ("b.md", "rust lifetimes describe how long references in rust remain valid for use."),
            ("c.md", "rust traits define shared behavior that types implement across rust code."),
        ]);

        let index = SnippetIndex::load(dir.path());
        let hits = index.search("rust", 2);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn long_chunks_are_truncated() {
        let long = format!("keyword {}", "filler words here ".repeat(60));
        let dir = corpus_with(&[("long.md", long.as_str())]);

        let index = SnippetIndex::load(dir.path());
        let hits = index.search("keyword", 1);
        assert!(hits[0].0.len() <= SNIPPET_MAX_CHARS + 4);
        assert!(hits[0].0.ends_with('…'));
    }

    #[tokio::test]
    async fn missing_corpus_reports_absence_not_error() {
        let capability =
            DocRetrievalCapability::new(SnippetIndex::load(Path::new("/nonexistent/corpus")));
        let output = capability
            .invoke(serde_json::json!({"query": "anything"}))
            .await
            .unwrap();

        assert!(output.success);
        assert!(output.output.contains("index not found"));
    }

    #[tokio::test]
    async fn no_hits_is_a_successful_empty_answer() {
        let capability = DocRetrievalCapability::new(SnippetIndex::empty());
        let output = capability
            .invoke(serde_json::json!({"query": "quantum chromodynamics"}))
            .await
            .unwrap();

        assert!(output.success);
        assert!(output.output.contains("No relevant passages"));
    }

    #[tokio::test]
    async fn snippets_carry_sources() {
        let dir = corpus_with(&[(
            "examples/train.py",
            "def train_model(dataset):\n    # gradient descent over the dataset batches\n    return fitted_model_with_weights",
        )]);

        let capability = DocRetrievalCapability::new(SnippetIndex::load(dir.path()));
        let output = capability
            .invoke(serde_json::json!({"query": "train model dataset", "k": 2}))
            .await
            .unwrap();

        assert!(output.success);
        assert!(output.output.contains("[source]"));
        assert!(output.output.contains("train.py"));
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let capability = DocRetrievalCapability::new(SnippetIndex::empty());
        let result = capability.invoke(serde_json::json!({})).await;
        assert!(result.is_err());
    }
}
