//! Event envelopes delivered to subscribers
//!
//! Every event on the wire is `{"type": ..., "payload": ...}` with a
//! normalized record as payload.

use crate::core_message::MessageRecord;
use crate::core_presence::TypingRecord;
use serde::{Deserialize, Serialize};

/// The envelope fanned out to subscribers of a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum EventEnvelope {
    /// A persisted message, normalized for the wire
    Message(MessageRecord),
    /// An ephemeral typing signal
    Typing(TypingRecord),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_message::AuthorRecord;
    use crate::core_workspace::{ChannelId, MessageId, UserId};

    #[test]
    fn test_message_envelope_shape() {
        let envelope = EventEnvelope::Message(MessageRecord {
            id: MessageId::new(1),
            content: "hello".to_string(),
            author: AuthorRecord {
                id: UserId::new(2),
                email: "bob@example.com".to_string(),
            },
            channel_id: ChannelId::new(3),
            created_at: "1970-01-01T00:00:00.000Z".to_string(),
        });

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["payload"]["content"], "hello");
        assert_eq!(json["payload"]["channelId"], 3);
        assert_eq!(json["payload"]["author"]["email"], "bob@example.com");
    }

    #[test]
    fn test_typing_envelope_shape() {
        let envelope = EventEnvelope::Typing(TypingRecord {
            user_id: UserId::new(2),
            username: "bob@example.com".to_string(),
            channel_id: ChannelId::new(3),
        });

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "typing");
        assert_eq!(json["payload"]["userId"], 2);
        assert_eq!(json["payload"]["username"], "bob@example.com");
    }

    #[test]
    fn test_envelope_round_trip() {
        let envelope = EventEnvelope::Typing(TypingRecord {
            user_id: UserId::new(9),
            username: "carol".to_string(),
            channel_id: ChannelId::new(4),
        });

        let json = serde_json::to_string(&envelope).unwrap();
        let back: EventEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
    }
}
