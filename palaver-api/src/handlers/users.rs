//! Directory registration shim
//!
//! Keeps the demo deployment self-contained: upstream identity
//! providers would normally populate the directory.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use palaver_core::core_users::UserRecord;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub username: String,
}

/// POST /api/users — register a directory entry
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserRecord>)> {
    let user = state
        .users
        .register(&req.email, &req.username)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(user)))
}
