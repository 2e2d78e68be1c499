//! HTTP handlers, one module per resource

use crate::state::AppState;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;

pub mod channels;
pub mod events;
pub mod members;
pub mod messages;
pub mod typing;
pub mod users;
pub mod workspaces;

/// Build the API router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Directory shim
        .route("/api/users", post(users::register))
        // Workspaces
        .route(
            "/api/workspaces",
            get(workspaces::list).post(workspaces::create),
        )
        .route(
            "/api/workspaces/:workspace_id",
            get(workspaces::show)
                .patch(workspaces::update)
                .delete(workspaces::remove),
        )
        // Workspace members
        .route(
            "/api/workspaces/:workspace_id/members",
            get(members::list_workspace_members).post(members::add_workspace_member),
        )
        .route(
            "/api/workspaces/:workspace_id/members/:user_id",
            delete(members::remove_workspace_member),
        )
        // Channels
        .route(
            "/api/workspaces/:workspace_id/channels",
            get(channels::list).post(channels::create),
        )
        .route(
            "/api/workspaces/:workspace_id/channels/:channel_id",
            get(channels::show)
                .patch(channels::update)
                .delete(channels::remove),
        )
        // Channel members
        .route(
            "/api/workspaces/:workspace_id/channels/:channel_id/members",
            get(members::list_channel_members).post(members::add_channel_member),
        )
        .route(
            "/api/workspaces/:workspace_id/channels/:channel_id/members/:user_id",
            delete(members::remove_channel_member),
        )
        // Messages
        .route(
            "/api/channels/:channel_id/messages",
            get(messages::list).post(messages::send),
        )
        .route(
            "/api/channels/:channel_id/messages/:message_id",
            get(messages::show)
                .patch(messages::update)
                .delete(messages::remove),
        )
        // Typing
        .route(
            "/api/channels/:channel_id/typing",
            get(typing::list).post(typing::signal),
        )
        // Event stream
        .route("/api/events", get(events::subscribe))
        .with_state(state)
}
