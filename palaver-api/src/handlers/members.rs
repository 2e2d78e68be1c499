//! Workspace and channel membership handlers

use super::channels::ensure_channel_in_workspace;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use palaver_core::core_workspace::{ChannelId, UserId, WorkspaceId};
use palaver_core::{MemberAddOutcome, MemberRef};
use serde::Deserialize;
use std::sync::Arc;

/// Member reference in a request body: by email or by id
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl AddMemberRequest {
    fn member_ref(&self) -> Result<MemberRef, ApiError> {
        if let Some(id) = self.user_id {
            return Ok(MemberRef::Id(UserId::new(id)));
        }
        match self.email.as_deref().map(str::trim) {
            Some(email) if !email.is_empty() => Ok(MemberRef::Email(email.to_string())),
            _ => Err(ApiError::BadRequest("email is required".to_string())),
        }
    }
}

/// GET /api/workspaces/:workspace_id/members
pub async fn list_workspace_members(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<i64>,
) -> ApiResult<Json<Vec<UserId>>> {
    let members = state
        .service
        .list_workspace_members(user.id, WorkspaceId::new(workspace_id))?;
    Ok(Json(members))
}

/// POST /api/workspaces/:workspace_id/members — owner only; idempotent
pub async fn add_workspace_member(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<i64>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<MemberAddOutcome>> {
    let member = req.member_ref()?;
    let outcome =
        state
            .service
            .add_workspace_member(user.id, WorkspaceId::new(workspace_id), &member)?;
    Ok(Json(outcome))
}

/// DELETE /api/workspaces/:workspace_id/members/:user_id — owner only;
/// cascades out of every channel of the workspace
pub async fn remove_workspace_member(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((workspace_id, member_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    state.service.remove_workspace_member(
        user.id,
        WorkspaceId::new(workspace_id),
        UserId::new(member_id),
    )?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/workspaces/:workspace_id/channels/:channel_id/members
pub async fn list_channel_members(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((workspace_id, channel_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Vec<UserId>>> {
    let channel_id = ChannelId::new(channel_id);
    ensure_channel_in_workspace(&state, channel_id, WorkspaceId::new(workspace_id))?;

    let channel = state.service.get_channel(user.id, channel_id)?;
    let mut members: Vec<UserId> = channel.members.into_iter().collect();
    members.sort();
    Ok(Json(members))
}

/// POST /api/workspaces/:workspace_id/channels/:channel_id/members —
/// owner only; the member must already belong to the workspace
pub async fn add_channel_member(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((workspace_id, channel_id)): Path<(i64, i64)>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<MemberAddOutcome>> {
    let channel_id = ChannelId::new(channel_id);
    ensure_channel_in_workspace(&state, channel_id, WorkspaceId::new(workspace_id))?;

    let member = req.member_ref()?;
    let outcome = state
        .service
        .add_channel_member(user.id, channel_id, &member)?;
    Ok(Json(outcome))
}

/// DELETE /api/workspaces/:workspace_id/channels/:channel_id/members/:user_id
pub async fn remove_channel_member(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path((workspace_id, channel_id, member_id)): Path<(i64, i64, i64)>,
) -> ApiResult<StatusCode> {
    let channel_id = ChannelId::new(channel_id);
    ensure_channel_in_workspace(&state, channel_id, WorkspaceId::new(workspace_id))?;

    state
        .service
        .remove_channel_member(user.id, channel_id, UserId::new(member_id))?;
    Ok(StatusCode::NO_CONTENT)
}
