//! SSE event stream
//!
//! The subscription gatekeeper: the broadcaster itself is a dumb
//! transport, so this handler re-checks channel visibility for every
//! requested topic on every subscription attempt before opening the
//! stream.

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use futures::StreamExt;
use palaver_core::core_events::Topic;
use palaver_core::ChatError;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct SubscribeParams {
    /// Comma-separated topic strings, e.g.
    /// `channel/3,typing/channel/3`
    pub topics: String,
}

/// GET /api/events?topics=... — subscribe to message and typing events
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(params): Query<SubscribeParams>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let mut topics = Vec::new();
    for raw in params
        .topics
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let topic = Topic::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown topic: {}", raw)))?;

        let allowed = state
            .service
            .authority()
            .can_view_channel(user.id, topic.channel_id())
            .map_err(ChatError::from)?;
        if !allowed {
            return Err(ApiError::Chat(ChatError::Forbidden));
        }

        topics.push(topic);
    }

    if topics.is_empty() {
        return Err(ApiError::BadRequest("topics is required".to_string()));
    }

    debug!(user = %user.id, topics = %params.topics, "event stream opened");

    let subscription = state.service.broadcaster().subscribe_many(&topics);
    let stream = subscription
        .into_stream()
        .map(|envelope| Ok(Event::default().json_data(&envelope).unwrap_or_default()));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
