//! Save-to-text capability — persists a final answer to a timestamped
//! .txt file and returns the file reference.
//!
//! This is the one capability restricted to at most one successful
//! invocation per turn; the turn controller enforces that via the
//! `CapabilitySpec` and blocks repeat requests with a synthesized error
//! result.

use async_trait::async_trait;
use chrono::Local;
use docfox_core::capability::{Capability, CapabilityOutput, CapabilitySpec};
use docfox_core::error::CapabilityError;
use std::path::PathBuf;
use tracing::info;

pub struct SaveTextCapability {
    output_dir: PathBuf,
}

impl SaveTextCapability {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }
}

#[async_trait]
impl Capability for SaveTextCapability {
    fn name(&self) -> &str {
        "save_text"
    }

    fn description(&self) -> &str {
        "Save the given final response text into a timestamped .txt file. Call this at most ONCE per user request. If you already saved, do not call again."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The exact final response text to write into the .txt file"
                },
                "filename_prefix": {
                    "type": "string",
                    "description": "Optional short prefix for the filename (no extension)",
                    "default": "response"
                }
            },
            "required": ["content"]
        })
    }

    fn spec(&self) -> CapabilitySpec {
        CapabilitySpec::once_per_turn()
    }

    async fn invoke(
        &self,
        arguments: serde_json::Value,
    ) -> Result<CapabilityOutput, CapabilityError> {
        let content = arguments["content"].as_str().ok_or_else(|| {
            CapabilityError::InvalidArguments("Missing 'content' argument".into())
        })?;

        let prefix = arguments["filename_prefix"].as_str().unwrap_or("response");

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| CapabilityError::Failed {
                name: "save_text".into(),
                reason: format!("Failed to create output directory: {e}"),
            })?;

        let ts = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{prefix}_{ts}.txt");
        let path = self.output_dir.join(&filename);

        tokio::fs::write(&path, content)
            .await
            .map_err(|e| CapabilityError::Failed {
                name: "save_text".into(),
                reason: format!("Failed to write file: {e}"),
            })?;

        info!(path = %path.display(), bytes = content.len(), "Answer saved to file");

        let payload = serde_json::json!({
            "message": format!("Saved output to {filename}"),
            "file_path": path.display().to_string(),
        });

        Ok(CapabilityOutput {
            call_id: String::new(),
            success: true,
            output: payload.to_string(),
            data: Some(payload),
        })
    }
}
