//! Typing presence handlers
//!
//! Clients throttle their own signal calls (~800 ms apart); the server
//! records whatever arrives and lets the TTL do the rest.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use palaver_core::core_workspace::{ChannelId, UserId};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUser {
    pub user_id: UserId,
    pub username: String,
}

/// POST /api/channels/:channel_id/typing — record and broadcast a
/// typing signal for the caller
pub async fn signal(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(channel_id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .service
        .signal_typing(user.id, ChannelId::new(channel_id))?;
    Ok(Json(json!({ "status": "ok" })))
}

/// GET /api/channels/:channel_id/typing — who is typing right now
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(channel_id): Path<i64>,
) -> ApiResult<Json<Vec<TypingUser>>> {
    let signals = state
        .service
        .typing_in(user.id, ChannelId::new(channel_id))?;
    Ok(Json(
        signals
            .into_iter()
            .map(|s| TypingUser {
                user_id: s.user_id,
                username: s.username,
            })
            .collect(),
    ))
}
