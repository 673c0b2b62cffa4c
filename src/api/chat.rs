//! Chat endpoint

use std::sync::Arc;

use axum::{Json, Router, body::Bytes, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState, ClientOrigin, parse_json};
use crate::presence::resolve_user_id;
use crate::relay::ChatMessage;

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// Chat request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: Option<String>,
    pub history: Option<Vec<ChatMessage>>,
    pub user_id: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Relay one chat turn upstream
async fn chat(
    State(state): State<Arc<ApiState>>,
    ClientOrigin(origin): ClientOrigin,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request: ChatRequest = parse_json(&body)?;

    if state.chat_counts_as_heartbeat {
        let user_id = resolve_user_id(request.user_id.as_deref(), &origin);
        state.presence.touch(&user_id).await;
    }

    let history = request.history.unwrap_or_default();
    let reply = state
        .relay
        .handle_chat(request.message.as_deref(), &history)
        .await?;

    Ok(Json(ChatResponse { reply }))
}
