//! Configuration loading and validation for docfox.
//!
//! Loads configuration from `~/.docfox/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The root configuration structure.
///
/// Maps directly to `~/.docfox/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used for turns
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Context retention bound, in turns
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    /// Directory where save_text writes .txt files
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Directory holding the local document corpus
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    /// Session store configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Chat notification configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4.1-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_max_turns() -> usize {
    6
}
fn default_save_dir() -> PathBuf {
    AppConfig::config_dir().join("saved")
}
fn default_docs_dir() -> PathBuf {
    AppConfig::config_dir().join("docs")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// "in_memory" or "file"
    #[serde(default = "default_session_backend")]
    pub backend: String,

    /// Root directory for the file backend
    #[serde(default = "default_session_dir")]
    pub dir: PathBuf,
}

fn default_session_backend() -> String {
    "in_memory".into()
}
fn default_session_dir() -> PathBuf {
    AppConfig::config_dir().join("sessions")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: default_session_backend(),
            dir: default_session_dir(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Bot token (xoxb-...). None disables delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Default destination when the model supplies none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<String>,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_turns", &self.max_turns)
            .field("save_dir", &self.save_dir)
            .field("docs_dir", &self.docs_dir)
            .field("session", &self.session)
            .field("chat", &self.chat)
            .finish()
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("bot_token", &redact(&self.bot_token))
            .field("default_channel", &self.default_channel)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_turns: default_max_turns(),
            save_dir: default_save_dir(),
            docs_dir: default_docs_dir(),
            session: SessionConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: file, then environment overrides, then validate.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("DOCFOX_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(url) = std::env::var("DOCFOX_API_URL") {
            config.api_url = url;
        }

        if let Ok(model) = std::env::var("DOCFOX_MODEL") {
            config.model = model;
        }

        if config.chat.bot_token.is_none() {
            config.chat.bot_token = std::env::var("SLACK_BOT_TOKEN").ok();
        }
        if config.chat.default_channel.is_none() {
            config.chat.default_channel = std::env::var("SLACK_DEFAULT_CHANNEL").ok();
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".docfox")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "max_turns must be at least 1".into(),
            ));
        }

        match self.session.backend.as_str() {
            "in_memory" | "file" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown session backend '{other}' (expected 'in_memory' or 'file')"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "gpt-4.1-mini");
        assert_eq!(config.max_turns, 6);
        assert_eq!(config.session.backend, "in_memory");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.max_turns, config.max_turns);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_max_turns_rejected() {
        let config = AppConfig {
            max_turns: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_session_backend_rejected() {
        let mut config = AppConfig::default();
        config.session.backend = "redis".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().model, "gpt-4.1-mini");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "gpt-4.1"
max_turns = 10

[session]
backend = "file"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.max_turns, 10);
        assert_eq!(config.session.backend, "file");
        // Untouched fields keep their defaults.
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.api_url, "https://api.openai.com/v1");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [not toml").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = AppConfig {
            api_key: Some("sk-very-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
