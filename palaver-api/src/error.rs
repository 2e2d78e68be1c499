//! API error mapping: one core error kind in, one HTTP status and
//! JSON `{error}` body out.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use palaver_core::ChatError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing or invalid identity header")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Chat(err) => match err {
                ChatError::WorkspaceNotFound
                | ChatError::ChannelNotFound
                | ChatError::MessageNotFound
                | ChatError::UserNotFound => StatusCode::NOT_FOUND,
                ChatError::Forbidden => StatusCode::FORBIDDEN,
                ChatError::InvalidInput(_)
                | ChatError::OwnerRemovalForbidden
                | ChatError::NotWorkspaceMember => StatusCode::BAD_REQUEST,
                ChatError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Chat(ChatError::ChannelNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Chat(ChatError::Forbidden).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Chat(ChatError::OwnerRemovalForbidden).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }
}
