//! Pub-sub topic names
//!
//! Topics are typed in the core and rendered as the namespaced strings
//! the wire uses: `channel/{channelId}` for durable message events and
//! `typing/channel/{channelId}` for ephemeral typing events.

use crate::core_workspace::ChannelId;
use std::fmt;

/// A pub-sub topic scoping event delivery to interested subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Durable message events for a channel
    Channel(ChannelId),
    /// Ephemeral typing events for a channel
    Typing(ChannelId),
}

impl Topic {
    /// The channel this topic is scoped to
    pub fn channel_id(&self) -> ChannelId {
        match self {
            Topic::Channel(id) | Topic::Typing(id) => *id,
        }
    }

    /// Parse a wire topic string
    pub fn parse(s: &str) -> Option<Topic> {
        if let Some(rest) = s.strip_prefix("typing/channel/") {
            return rest.parse::<i64>().ok().map(|id| Topic::Typing(ChannelId::new(id)));
        }
        if let Some(rest) = s.strip_prefix("channel/") {
            return rest.parse::<i64>().ok().map(|id| Topic::Channel(ChannelId::new(id)));
        }
        None
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Channel(id) => write!(f, "channel/{}", id),
            Topic::Typing(id) => write!(f, "typing/channel/{}", id),
        }
    }
}
