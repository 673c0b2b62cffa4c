//! TOML configuration file loading
//!
//! Supports `~/.config/tutor/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TutorConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Upstream completion API
    #[serde(default)]
    pub upstream: UpstreamFileConfig,

    /// Chat relay behaviour
    #[serde(default)]
    pub chat: ChatFileConfig,

    /// Presence tracking
    #[serde(default)]
    pub presence: PresenceFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Directory with the front-end build
    pub static_dir: Option<String>,
}

/// Upstream API configuration
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamFileConfig {
    /// Chat completions endpoint URL
    pub api_url: Option<String>,

    /// Model identifier
    pub model: Option<String>,

    /// API key (prefer the environment)
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Chat relay configuration
#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub history_limit: Option<usize>,
    /// Whether a chat request refreshes the caller's presence
    pub counts_as_heartbeat: Option<bool>,
}

/// Presence tracking configuration
#[derive(Debug, Default, Deserialize)]
pub struct PresenceFileConfig {
    pub timeout_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

/// Load the TOML config file from the standard path
///
/// Returns `TutorConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> TutorConfigFile {
    config_file_path().map_or_else(TutorConfigFile::default, |path| load_from(&path))
}

/// Load a TOML config file from `path`, falling back to defaults
pub fn load_from(path: &Path) -> TutorConfigFile {
    if !path.exists() {
        return TutorConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TutorConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TutorConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/tutor/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("tutor").join("config.toml"))
}
