//! Configuration management for the tutor gateway
//!
//! Values are layered env > TOML file > defaults.

pub mod file;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::presence::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TIMEOUT};
use crate::relay::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, RelaySettings, openai::DEFAULT_API_URL};

pub use file::TutorConfigFile;

/// Default API server port
pub const DEFAULT_PORT: u16 = 3000;

/// Default upstream request timeout
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Tutor gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Upstream completion API configuration
    pub upstream: UpstreamConfig,

    /// Chat relay configuration
    pub chat: ChatConfig,

    /// Presence tracking configuration
    pub presence: PresenceConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

/// Upstream completion API configuration
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Chat completions endpoint
    pub api_url: String,

    /// Model identifier
    pub model: String,

    /// API key (from `TUTOR_API_KEY` or `OPENAI_API_KEY`)
    pub api_key: Option<SecretString>,

    /// Per-request timeout
    pub timeout: Duration,
}

/// Chat relay configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub history_limit: usize,

    /// Refresh the caller's presence on every chat request
    pub counts_as_heartbeat: bool,
}

/// Presence tracking configuration
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// Idle time before a user is evicted
    pub timeout: Duration,

    /// How often idle users are swept
    pub sweep_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment and config file
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Layer an environment lookup over a parsed config file
    #[must_use]
    pub fn from_sources<F>(fc: TutorConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            port: parse_var(env("TUTOR_PORT"))
                .or_else(|| parse_var(env("PORT")))
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            static_dir: env("TUTOR_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        let upstream = UpstreamConfig {
            api_url: env("TUTOR_API_URL")
                .or(fc.upstream.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: env("TUTOR_MODEL")
                .or(fc.upstream.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: env("TUTOR_API_KEY")
                .or_else(|| env("OPENAI_API_KEY"))
                .or(fc.upstream.api_key)
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            timeout: nonzero_secs(
                "upstream.timeout",
                parse_var(env("TUTOR_UPSTREAM_TIMEOUT")).or(fc.upstream.timeout_secs),
                DEFAULT_UPSTREAM_TIMEOUT,
            ),
        };

        let defaults = RelaySettings::default();
        let chat = ChatConfig {
            system_prompt: env("TUTOR_SYSTEM_PROMPT")
                .or(fc.chat.system_prompt)
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            temperature: fc.chat.temperature.unwrap_or(defaults.temperature),
            max_tokens: fc.chat.max_tokens.unwrap_or(defaults.max_tokens),
            history_limit: fc.chat.history_limit.unwrap_or(defaults.history_limit),
            counts_as_heartbeat: env("TUTOR_CHAT_COUNTS_AS_HEARTBEAT")
                .and_then(|v| parse_flag("TUTOR_CHAT_COUNTS_AS_HEARTBEAT", &v))
                .or(fc.chat.counts_as_heartbeat)
                .unwrap_or(true),
        };

        let presence = PresenceConfig {
            timeout: nonzero_secs("presence.timeout", fc.presence.timeout_secs, DEFAULT_TIMEOUT),
            sweep_interval: nonzero_secs(
                "presence.sweep_interval",
                fc.presence.sweep_interval_secs,
                DEFAULT_SWEEP_INTERVAL,
            ),
        };

        Self {
            server,
            upstream,
            chat,
            presence,
        }
    }

    /// Relay parameters derived from this configuration
    #[must_use]
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            model: self.upstream.model.clone(),
            system_prompt: self.chat.system_prompt.clone(),
            temperature: self.chat.temperature,
            max_tokens: self.chat.max_tokens,
            history_limit: self.chat.history_limit,
        }
    }
}

/// Parse an optional raw value, ignoring anything malformed
fn parse_var<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Seconds as a `Duration`; zero falls back to `default`
fn nonzero_secs(key: &str, secs: Option<u64>, default: Duration) -> Duration {
    match secs {
        Some(0) => {
            tracing::warn!(
                key,
                default_secs = default.as_secs(),
                "zero duration not allowed, using default"
            );
            default
        }
        Some(secs) => Duration::from_secs(secs),
        None => default,
    }
}

/// Parse a boolean switch; unrecognised values are ignored with a warning
fn parse_flag(key: &str, value: &str) -> Option<bool> {
    let value = value.trim();
    if ["1", "true", "yes", "on"]
        .iter()
        .any(|v| value.eq_ignore_ascii_case(v))
    {
        Some(true)
    } else if ["0", "false", "no", "off"]
        .iter()
        .any(|v| value.eq_ignore_ascii_case(v))
    {
        Some(false)
    } else {
        tracing::warn!(key, value, "unrecognised boolean value, ignoring");
        None
    }
}
