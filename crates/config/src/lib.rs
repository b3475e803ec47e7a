//! Configuration loading and management for Causerie.
//!
//! Loads configuration from `<app-data>/causerie/config.toml` with sensible
//! defaults for every field. The app-data root follows the platform
//! convention (`%APPDATA%` on Windows, `~/Library/Preferences` on macOS,
//! `~/.local/share` elsewhere) and can be overridden with the
//! `CAUSERIE_DATA_DIR` environment variable, which tests rely on.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `config.toml` under the app-data root. Every field has
/// a default so a missing or partial file still yields a working config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default model for new conversations
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Model used to compute embeddings for retrieval
    #[serde(default = "default_model")]
    pub embedding_model: String,

    /// Search URL prefix; the normalized query is appended verbatim
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Retrieval chunk window, in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of top-ranked chunks fed to synthesis
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Token budget for replayed conversation history
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,

    /// Whether sendMessage creates the conversation when it does not exist
    #[serde(default = "default_true")]
    pub auto_create_on_message: bool,

    /// System prompt override (replaces the builtin prompt entirely)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Ollama runtime configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_model() -> String {
    "gemma2:2b".into()
}
fn default_search_url() -> String {
    "https://www.google.com/search?q=".into()
}
fn default_chunk_size() -> usize {
    300
}
fn default_chunk_overlap() -> usize {
    50
}
fn default_top_k() -> usize {
    5
}
fn default_token_budget() -> usize {
    2048
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    65440
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `<app-data root>/config.toml`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::app_data_root().join("config.toml"))
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

    /// The app-data root directory.
    ///
    /// `CAUSERIE_DATA_DIR` overrides the platform default.
    pub fn app_data_root() -> PathBuf {
        if let Ok(dir) = std::env::var("CAUSERIE_DATA_DIR") {
            return PathBuf::from(dir);
        }
        platform_app_data().join("causerie")
    }

    /// Where conversation records live.
    pub fn conversations_dir(root: &Path) -> PathBuf {
        root.join("conversations")
    }

    /// Where model descriptor files live.
    pub fn models_dir(root: &Path) -> PathBuf {
        root.join("models")
    }

    /// Where template descriptor files live.
    pub fn templates_dir(root: &Path) -> PathBuf {
        root.join("templates")
    }

    /// Scratch space for downloaded documents and other transient files.
    pub fn workspace_dir(root: &Path) -> PathBuf {
        root.join("workspace")
    }

    /// Create the whole app-data tree if missing.
    pub fn ensure_dirs(root: &Path) -> Result<(), ConfigError> {
        for dir in [
            root.to_path_buf(),
            Self::conversations_dir(root),
            Self::models_dir(root),
            Self::templates_dir(root),
            Self::workspace_dir(root),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| ConfigError::ReadError {
                path: dir.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ValidationError("chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::ValidationError(
                "chunk_overlap must be smaller than chunk_size".into(),
            ));
        }
        if self.top_k == 0 {
            return Err(ConfigError::ValidationError("top_k must be > 0".into()));
        }
        if self.token_budget == 0 {
            return Err(ConfigError::ValidationError(
                "token_budget must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            embedding_model: default_model(),
            search_url: default_search_url(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            token_budget: default_token_budget(),
            auto_create_on_message: true,
            system_prompt: None,
            gateway: GatewayConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// The platform app-data directory.
fn platform_app_data() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default\\AppData\\Roaming"))
    }
    #[cfg(target_os = "macos")]
    {
        home().join("Library").join("Preferences")
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        home().join(".local").join("share")
    }
}

#[cfg(not(target_os = "windows"))]
fn home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for causerie_core::Error {
    fn from(e: ConfigError) -> Self {
        causerie_core::Error::Config {
            message: e.to_string(),
        }
    }
}
