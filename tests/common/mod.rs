//! Shared test utilities
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use secrecy::SecretString;
use tower::ServiceExt;
use tutor_gateway::relay::CompletionRequest;
use tutor_gateway::{
    ApiState, ChatRelay, CompletionBackend, Error, PresenceTracker, RelaySettings, Result,
};

/// Backend returning a canned reply and recording what it was sent
pub struct MockBackend {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    last: Mutex<Option<CompletionRequest>>,
}

impl MockBackend {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, request: &CompletionRequest, _api_key: &SecretString) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        self.reply.clone().map_err(Error::Upstream)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Build API state around a backend
pub fn test_state(
    backend: Arc<MockBackend>,
    api_key: Option<&str>,
    chat_counts_as_heartbeat: bool,
) -> Arc<ApiState> {
    let relay = ChatRelay::new(
        backend,
        api_key.map(|k| SecretString::from(k.to_string())),
        RelaySettings::default(),
    );

    Arc::new(ApiState {
        presence: PresenceTracker::default(),
        relay,
        chat_counts_as_heartbeat,
    })
}

/// Send a request through the router and decode the JSON response
pub async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    body: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
