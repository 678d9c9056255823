//! Web search capability — stub that returns mock ranked results.
//!
//! In production this would call a real search API scoped to official
//! documentation domains. The stub returns plausible results with source
//! attribution so the turn loop can be tested end-to-end without network
//! access.

use async_trait::async_trait;
use docfox_core::capability::{Capability, CapabilityOutput};
use docfox_core::error::CapabilityError;

pub struct WebSearchCapability;

#[async_trait]
impl Capability for WebSearchCapability {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date official documentation. Returns a ranked list of results with titles, URLs, and snippets. Cite the URLs in your answer."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
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

        let num_results = arguments["num_results"].as_u64().unwrap_or(3).min(5) as usize;

        // Deterministic mock results keyed on query content.
        let results = generate_mock_results(query, num_results);
        let output = serde_json::to_string_pretty(&results).unwrap_or_default();

        Ok(CapabilityOutput {
            call_id: String::new(),
            success: true,
            output,
            data: Some(serde_json::to_value(&results).unwrap_or_default()),
        })
    }
}

#[derive(Clone, serde::Serialize)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

fn generate_mock_results(query: &str, count: usize) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    // Context-aware fixtures for common documentation topics.
    let templates: Vec<(&str, Vec<SearchResult>)> = vec![
        ("pandas", vec![
            SearchResult {
                title: "pandas.DataFrame.merge — pandas documentation".into(),
                url: "https://pandas.pydata.org/docs/reference/api/pandas.DataFrame.merge.html".into(),
                snippet: "Merge DataFrame or named Series objects with a database-style join. Parameters: right, how, on, left_on, right_on, suffixes.".into(),
            },
            SearchResult {
                title: "Merge, join, concatenate and compare — pandas".into(),
                url: "https://pandas.pydata.org/docs/user_guide/merging.html".into(),
                snippet: "pandas provides various methods for combining and comparing Series or DataFrame: concat, merge, join, combine_first.".into(),
            },
            SearchResult {
                title: "pandas API reference".into(),
                url: "https://pandas.pydata.org/docs/reference/index.html".into(),
                snippet: "This page gives an overview of all public pandas objects, functions and methods.".into(),
            },
        ]),
        ("python", vec![
            SearchResult {
                title: "The Python Tutorial — Python documentation".into(),
                url: "https://docs.python.org/3/tutorial/".into(),
                snippet: "Python is an easy to learn, powerful programming language. This tutorial introduces the reader informally to the basic concepts.".into(),
            },
            SearchResult {
                title: "Built-in Types — Python documentation".into(),
                url: "https://docs.python.org/3/library/stdtypes.html".into(),
                snippet: "The principal built-in types are numerics, sequences, mappings, classes, instances and exceptions.".into(),
            },
        ]),
        ("rust", vec![
            SearchResult {
                title: "The Rust Programming Language".into(),
                url: "https://doc.rust-lang.org/book/".into(),
                snippet: "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
            },
            SearchResult {
                title: "Rust by Example".into(),
                url: "https://doc.rust-lang.org/rust-by-example/".into(),
                snippet: "A collection of runnable examples that illustrate Rust concepts and standard library usage.".into(),
            },
        ]),
    ];

    for (keyword, results) in &templates {
        if q.contains(keyword) {
            return results.iter().take(count).cloned().collect();
        }
    }

    // Generic fallback.
    (0..count)
        .map(|i| SearchResult {
            title: format!("Result {} for: {}", i + 1, query),
            url: format!("https://example.com/search?q={}&p={}", urlencode(query), i + 1),
            snippet: format!(
                "This is a mock search result for the query '{}'. In production, this would contain real content.",
                query
            ),
        })
        .collect()
}

fn urlencode(s: &str) -> String {
    s.replace(' ', "+")
}
