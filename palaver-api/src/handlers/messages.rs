//! Message handlers

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use palaver_core::core_message::MessageRecord;
use palaver_core::core_workspace::{ChannelId, MessageId};
use palaver_core::ChatError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    palaver_core::core_message::DEFAULT_PAGE_LIMIT
}

/// The message id must actually live in the channel named by the path
fn ensure_message_in_channel(
    state: &AppState,
    message: MessageId,
    channel: ChannelId,
) -> Result<(), ApiError> {
    if state.service.message_channel(message)? != channel {
        return Err(ApiError::Chat(ChatError::MessageNotFound));
    }
    Ok(())
}

/// POST /api/channels/:channel_id/messages — append and broadcast
pub async fn send(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(channel_id): Path<i64>,
    Json(req): Json<ContentRequest>,
) -> ApiResult<(StatusCode, Json<MessageRecord>)> {
    let message = state
        .service
        .post_message(user.id, ChannelId::new(channel_id), &req.content)?;
    let record = state.service.normalize_message(&message);
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/channels/:channel_id/messages?page&limit — ascending
/// creation order, offset pagination
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(channel_id): Path<i64>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<Vec<MessageRecord>>> {
    let records = state.service.list_messages(
        user.id,
        ChannelId::new(channel_id),
        params.page,
        params.limit,
    )?;
    Ok(Json(records))
}

/// GET /api/channels/:channel_id/messages/:message_id
pub async fn show(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((channel_id, message_id)): Path<(i64, i64)>,
) -> ApiResult<Json<MessageRecord>> {
    let message_id = MessageId::new(message_id);
    ensure_message_in_channel(&state, message_id, ChannelId::new(channel_id))?;

    let message = state.service.get_message(user.id, message_id)?;
    Ok(Json(state.service.normalize_message(&message)))
}

/// PATCH /api/channels/:channel_id/messages/:message_id — author only
pub async fn update(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((channel_id, message_id)): Path<(i64, i64)>,
    Json(req): Json<ContentRequest>,
) -> ApiResult<Json<MessageRecord>> {
    let message_id = MessageId::new(message_id);
    ensure_message_in_channel(&state, message_id, ChannelId::new(channel_id))?;

    let message = state.service.edit_message(user.id, message_id, &req.content)?;
    Ok(Json(state.service.normalize_message(&message)))
}

/// DELETE /api/channels/:channel_id/messages/:message_id — author only
pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((channel_id, message_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    let message_id = MessageId::new(message_id);
    ensure_message_in_channel(&state, message_id, ChannelId::new(channel_id))?;

    state.service.delete_message(user.id, message_id)?;
    Ok(StatusCode::NO_CONTENT)
}
