//! HTTP API server for the tutor gateway

pub mod chat;
mod error;
pub mod health;
mod origin;
pub mod presence;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use origin::ClientOrigin;

use crate::presence::PresenceTracker;
use crate::relay::ChatRelay;
use crate::{Error, Result};

/// Shared state for API handlers
pub struct ApiState {
    pub presence: PresenceTracker,
    pub relay: ChatRelay,
    /// Whether chat requests refresh the caller's presence
    pub chat_counts_as_heartbeat: bool,
}

/// Plain `{"status": "ok"}` body
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    #[must_use]
    pub const fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Parse a JSON request body; an empty body yields the default value
///
/// # Errors
///
/// Returns `Error::MalformedRequest` if the body is not valid JSON for `T`
pub fn parse_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| Error::MalformedRequest(e.to_string()))
}

/// Build the API routes without static files or middleware
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(chat::router(state.clone()))
        .merge(presence::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state))
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    presence: PresenceTracker,
    relay: ChatRelay,
    port: u16,
    static_dir: Option<PathBuf>,
    chat_counts_as_heartbeat: bool,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(presence: PresenceTracker, relay: ChatRelay, port: u16) -> Self {
        Self {
            presence,
            relay,
            port,
            static_dir: None,
            chat_counts_as_heartbeat: true,
        }
    }

    /// Set the static files directory for serving the web UI
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Set whether chat requests count as heartbeats
    #[must_use]
    pub fn chat_counts_as_heartbeat(mut self, enabled: bool) -> Self {
        self.chat_counts_as_heartbeat = enabled;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            presence: self.presence,
            relay: self.relay,
            chat_counts_as_heartbeat: self.chat_counts_as_heartbeat,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes and middleware
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = router(self.state.clone());

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.state.relay.has_credential() {
            tracing::warn!("no upstream API key configured - chat requests will fail");
        }

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr).await.inspect_err(|e| {
            tracing::error!(error = %e, %addr, "failed to bind API server");
        })?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        Ok(())
    }
}
