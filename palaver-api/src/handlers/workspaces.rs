//! Workspace lifecycle handlers

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use palaver_core::core_workspace::{UserId, Workspace, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceListItem {
    pub id: WorkspaceId,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceItem {
    pub id: WorkspaceId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: String,
    pub members: Vec<UserId>,
}

impl From<Workspace> for WorkspaceItem {
    fn from(ws: Workspace) -> Self {
        let mut members: Vec<UserId> = ws.members.into_iter().collect();
        members.sort();
        Self {
            id: ws.id,
            name: ws.name,
            owner_id: ws.owner_id,
            created_at: ws.created_at.to_rfc3339(),
            members,
        }
    }
}

/// GET /api/workspaces — workspaces the caller belongs to
pub async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<WorkspaceListItem>>> {
    let workspaces = state.service.list_workspaces(user.id)?;
    Ok(Json(
        workspaces
            .into_iter()
            .map(|ws| WorkspaceListItem {
                id: ws.id,
                name: ws.name,
            })
            .collect(),
    ))
}

/// POST /api/workspaces — create a workspace owned by the caller
pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<NameRequest>,
) -> ApiResult<(StatusCode, Json<WorkspaceItem>)> {
    let workspace = state.service.create_workspace(user.id, &req.name)?;
    Ok((StatusCode::CREATED, Json(workspace.into())))
}

/// GET /api/workspaces/:workspace_id
pub async fn show(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<i64>,
) -> ApiResult<Json<WorkspaceItem>> {
    let workspace = state
        .service
        .get_workspace(user.id, WorkspaceId::new(workspace_id))?;
    Ok(Json(workspace.into()))
}

/// PATCH /api/workspaces/:workspace_id
pub async fn update(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<i64>,
    Json(req): Json<NameRequest>,
) -> ApiResult<Json<WorkspaceItem>> {
    let workspace =
        state
            .service
            .rename_workspace(user.id, WorkspaceId::new(workspace_id), &req.name)?;
    Ok(Json(workspace.into()))
}

/// DELETE /api/workspaces/:workspace_id — cascades channels and messages
pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .service
        .delete_workspace(user.id, WorkspaceId::new(workspace_id))?;
    Ok(StatusCode::NO_CONTENT)
}
