//! Message model and wire normalization
//!
//! A message's id and creation timestamp are immutable once assigned;
//! only the content may change, and only at the author's hand.

use crate::core_users::UserRecord;
use crate::core_workspace::{ChannelId, MessageId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A message in a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id, strictly increasing per the storage key
    pub id: MessageId,

    /// Channel this message belongs to
    pub channel_id: ChannelId,

    /// User who wrote this message
    pub author: UserId,

    /// Message body
    pub content: String,

    /// When the message was created (never changes on edit)
    pub created_at: Timestamp,
}

impl Message {
    /// Check whether a user is the author
    pub fn is_author(&self, user: UserId) -> bool {
        self.author == user
    }

    /// Normalize for the wire: the shape every subscriber and list
    /// response sees
    pub fn normalize(&self, author: &UserRecord) -> MessageRecord {
        MessageRecord {
            id: self.id,
            content: self.content.clone(),
            author: AuthorRecord {
                id: author.id,
                email: author.email.clone(),
            },
            channel_id: self.channel_id,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

/// Author identity embedded in a normalized message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: UserId,
    pub email: String,
}

/// Normalized message payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: MessageId,
    pub content: String,
    pub author: AuthorRecord,
    pub channel_id: ChannelId,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> UserRecord {
        UserRecord {
            id: UserId::new(2),
            email: "bob@example.com".to_string(),
            username: "bob".to_string(),
        }
    }

    #[test]
    fn test_is_author() {
        let message = Message {
            id: MessageId::new(1),
            channel_id: ChannelId::new(1),
            author: UserId::new(2),
            content: "hello".to_string(),
            created_at: Timestamp::from_millis(0),
        };

        assert!(message.is_author(UserId::new(2)));
        assert!(!message.is_author(UserId::new(3)));
    }

    #[test]
    fn test_normalize_shape() {
        let message = Message {
            id: MessageId::new(1),
            channel_id: ChannelId::new(3),
            author: UserId::new(2),
            content: "hello".to_string(),
            created_at: Timestamp::from_millis(0),
        };

        let record = message.normalize(&bob());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["content"], "hello");
        assert_eq!(json["author"]["id"], 2);
        assert_eq!(json["author"]["email"], "bob@example.com");
        assert_eq!(json["channelId"], 3);
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00.000Z");
    }
}
