//! Channel lifecycle handlers (workspace-nested routes)

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use palaver_core::core_workspace::{Channel, ChannelId, ChannelSummary, UserId, WorkspaceId};
use palaver_core::ChatError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub id: ChannelId,
    pub workspace_id: WorkspaceId,
    pub name: String,
    pub created_at: String,
    pub members: Vec<UserId>,
}

impl From<Channel> for ChannelItem {
    fn from(channel: Channel) -> Self {
        let mut members: Vec<UserId> = channel.members.into_iter().collect();
        members.sort();
        Self {
            id: channel.id,
            workspace_id: channel.workspace_id,
            name: channel.name,
            created_at: channel.created_at.to_rfc3339(),
            members,
        }
    }
}

/// Reject ids that point at a channel of some other workspace
pub(super) fn ensure_channel_in_workspace(
    state: &AppState,
    channel: ChannelId,
    workspace: WorkspaceId,
) -> Result<(), ApiError> {
    if state.service.channel_workspace(channel)? != workspace {
        return Err(ApiError::Chat(ChatError::ChannelNotFound));
    }
    Ok(())
}

/// GET /api/workspaces/:workspace_id/channels — all channels with a
/// per-entry membership flag
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<i64>,
) -> ApiResult<Json<Vec<ChannelSummary>>> {
    let channels = state
        .service
        .list_channels(user.id, WorkspaceId::new(workspace_id))?;
    Ok(Json(channels))
}

/// POST /api/workspaces/:workspace_id/channels — owner only
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<i64>,
    Json(req): Json<NameRequest>,
) -> ApiResult<(StatusCode, Json<ChannelItem>)> {
    let channel =
        state
            .service
            .create_channel(user.id, WorkspaceId::new(workspace_id), &req.name)?;
    Ok((StatusCode::CREATED, Json(channel.into())))
}

/// GET /api/workspaces/:workspace_id/channels/:channel_id
pub async fn show(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((workspace_id, channel_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ChannelItem>> {
    let channel_id = ChannelId::new(channel_id);
    ensure_channel_in_workspace(&state, channel_id, WorkspaceId::new(workspace_id))?;

    let channel = state.service.get_channel(user.id, channel_id)?;
    Ok(Json(channel.into()))
}

/// PATCH /api/workspaces/:workspace_id/channels/:channel_id — owner only
pub async fn update(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((workspace_id, channel_id)): Path<(i64, i64)>,
    Json(req): Json<NameRequest>,
) -> ApiResult<Json<ChannelItem>> {
    let channel_id = ChannelId::new(channel_id);
    ensure_channel_in_workspace(&state, channel_id, WorkspaceId::new(workspace_id))?;

    let channel = state.service.rename_channel(user.id, channel_id, &req.name)?;
    Ok(Json(channel.into()))
}

/// DELETE /api/workspaces/:workspace_id/channels/:channel_id — owner
/// only; messages go first, then the channel
pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((workspace_id, channel_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    let channel_id = ChannelId::new(channel_id);
    ensure_channel_in_workspace(&state, channel_id, WorkspaceId::new(workspace_id))?;

    state.service.delete_channel(user.id, channel_id)?;
    Ok(StatusCode::NO_CONTENT)
}
