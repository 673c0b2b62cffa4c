//! Tutor Gateway - chat relay and presence tracking for a language-learning front end
//!
//! - Chat relay to an OpenAI-compatible completion API with a fixed tutor prompt
//! - Markdown stripping of model replies
//! - Approximate online-user count from client heartbeats
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Front end                         │
//! │        chat  │  heartbeat  │  online count           │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Tutor Gateway                        │
//! │   Chat Relay  │  Sanitizer  │  Presence Tracker      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            Upstream completion API                   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod presence;
pub mod relay;
pub mod sanitizer;

pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use config::Config;
pub use error::{Error, Result};
pub use presence::PresenceTracker;
pub use relay::{ChatMessage, ChatRelay, CompletionBackend, OpenAiClient, RelaySettings, Role};
pub use sanitizer::sanitize;
