//! Heartbeat and online-count endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState, ClientOrigin, StatusResponse, parse_json};
use crate::presence::resolve_user_id;

/// Build presence router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/ping", post(ping))
        .route("/api/online-count", get(online_count))
        .with_state(state)
}

/// Heartbeat request body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingRequest {
    pub user_id: Option<String>,
}

/// Online count response
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Refresh the caller's presence
async fn ping(
    State(state): State<Arc<ApiState>>,
    ClientOrigin(origin): ClientOrigin,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let request: PingRequest = parse_json(&body)?;
    let user_id = resolve_user_id(request.user_id.as_deref(), &origin);

    state.presence.touch(&user_id).await;
    tracing::trace!(user_id = %user_id, "heartbeat");

    Ok(Json(StatusResponse::ok()))
}

/// Approximate number of users seen within the presence timeout
async fn online_count(State(state): State<Arc<ApiState>>) -> Json<CountResponse> {
    Json(CountResponse {
        count: state.presence.count().await,
    })
}
