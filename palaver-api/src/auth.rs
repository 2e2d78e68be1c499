//! Header-based identity shim
//!
//! Credential issuance lives outside this service; upstream
//! authentication is expected to inject the caller's user id in the
//! `x-user-id` header. The extractor only verifies the id against the
//! user directory.

use crate::error::ApiError;
use crate::state::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use palaver_core::core_users::{UserDirectory, UserRecord};
use palaver_core::core_workspace::UserId;
use std::sync::Arc;

/// Identity header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, resolved from the identity header
pub struct AuthUser(pub UserRecord);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let id: i64 = raw.parse().map_err(|_| ApiError::Unauthorized)?;
        let user = state
            .users
            .get(UserId::new(id))
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}
