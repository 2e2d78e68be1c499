//! Append-only message log with author-scoped edit/delete
//!
//! Reads and writes are gated through the membership authority; a
//! successful post is pushed into the event broadcaster. Broadcast is
//! an enhancement, not a correctness requirement — the mutation has
//! already committed by the time the event fans out, so publish
//! outcomes are logged and never surfaced to the caller.

use crate::core_events::{EventBroadcaster, EventEnvelope, Topic};
use crate::core_users::UserRecord;
use crate::core_workspace::{
    ChannelId, ChatStore, MembershipAuthority, MembershipError, MessageId, StorageError,
    Timestamp, UserId,
};
use std::sync::Arc;
use tracing::debug;

use super::message::Message;

/// Default page size for message listings
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Upper bound on a single listing page
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Message log errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("channel not found")]
    ChannelNotFound,

    #[error("message not found")]
    MessageNotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("message content must not be empty")]
    InvalidContent,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<MembershipError> for MessageError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::ChannelNotFound | MembershipError::WorkspaceNotFound => {
                MessageError::ChannelNotFound
            }
            MembershipError::Storage(e) => MessageError::Storage(e),
            MembershipError::OwnerRemovalForbidden | MembershipError::NotWorkspaceMember => {
                MessageError::Forbidden
            }
        }
    }
}

/// Ordered, append-only message history per channel
pub struct MessageLog {
    store: Arc<ChatStore>,
    authority: Arc<MembershipAuthority>,
    broadcaster: Arc<EventBroadcaster>,
}

impl MessageLog {
    pub fn new(
        store: Arc<ChatStore>,
        authority: Arc<MembershipAuthority>,
        broadcaster: Arc<EventBroadcaster>,
    ) -> Self {
        Self {
            store,
            authority,
            broadcaster,
        }
    }

    /// Append a message to a channel and broadcast the normalized
    /// record to `channel/{id}` subscribers.
    pub fn post(
        &self,
        channel: ChannelId,
        author: &UserRecord,
        content: &str,
    ) -> Result<Message, MessageError> {
        if content.trim().is_empty() {
            return Err(MessageError::InvalidContent);
        }

        if !self.authority.can_view_channel(author.id, channel)? {
            return Err(MessageError::Forbidden);
        }

        let message = self
            .store
            .insert_message(channel, author.id, content, Timestamp::now())?;
        crate::metrics::record_message_posted();

        let delivered = self.broadcaster.publish(
            Topic::Channel(channel),
            EventEnvelope::Message(message.normalize(author)),
        );
        debug!(message = %message.id, %channel, delivered, "message posted");

        Ok(message)
    }

    /// Replace a message's content. Author only — even the workspace
    /// owner is refused.
    pub fn edit(
        &self,
        message: MessageId,
        new_content: &str,
        actor: UserId,
    ) -> Result<Message, MessageError> {
        if new_content.trim().is_empty() {
            return Err(MessageError::InvalidContent);
        }

        let existing = self
            .store
            .get_message(message)?
            .ok_or(MessageError::MessageNotFound)?;
        if !existing.is_author(actor) {
            return Err(MessageError::Forbidden);
        }

        self.store.update_message_content(message, new_content)?;

        Ok(Message {
            content: new_content.to_string(),
            ..existing
        })
    }

    /// Delete a single message. Author only.
    pub fn delete(&self, message: MessageId, actor: UserId) -> Result<(), MessageError> {
        let existing = self
            .store
            .get_message(message)?
            .ok_or(MessageError::MessageNotFound)?;
        if !existing.is_author(actor) {
            return Err(MessageError::Forbidden);
        }

        self.store.delete_message(message)?;
        debug!(%message, "message deleted");
        Ok(())
    }

    /// Fetch a single message, gated by channel visibility
    pub fn get(&self, message: MessageId, user: UserId) -> Result<Message, MessageError> {
        let existing = self
            .store
            .get_message(message)?
            .ok_or(MessageError::MessageNotFound)?;
        if !self.authority.can_view_channel(user, existing.channel_id)? {
            return Err(MessageError::Forbidden);
        }
        Ok(existing)
    }

    /// List a page of a channel's messages in ascending
    /// (created_at, id) order. Pages are restartable: any page may be
    /// re-requested.
    pub fn list(
        &self,
        channel: ChannelId,
        user: UserId,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Message>, MessageError> {
        if !self.authority.can_view_channel(user, channel)? {
            return Err(MessageError::Forbidden);
        }

        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let offset = (page as u64 - 1) * limit as u64;

        Ok(self.store.list_messages(channel, limit, offset)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        store: Arc<ChatStore>,
        authority: Arc<MembershipAuthority>,
        broadcaster: Arc<EventBroadcaster>,
        log: MessageLog,
        alice: UserRecord,
        bob: UserRecord,
    }

    fn user(id: i64, name: &str) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            email: format!("{}@example.com", name),
            username: name.to_string(),
        }
    }

    fn setup() -> Fixture {
        let store = Arc::new(ChatStore::memory().unwrap());
        let authority = Arc::new(MembershipAuthority::new(store.clone(), false));
        let broadcaster = Arc::new(EventBroadcaster::default());
        let log = MessageLog::new(store.clone(), authority.clone(), broadcaster.clone());
        Fixture {
            store,
            authority,
            broadcaster,
            log,
            alice: user(1, "alice"),
            bob: user(2, "bob"),
        }
    }

    /// Workspace owned by alice with a "general" channel she is in
    fn workspace_with_channel(fx: &Fixture) -> (crate::core_workspace::Workspace, ChannelId) {
        let ws = fx
            .store
            .create_workspace("Engineering", fx.alice.id, Timestamp::now())
            .unwrap();
        let channel = fx
            .store
            .create_channel(ws.id, "general", fx.alice.id, Timestamp::now())
            .unwrap();
        (ws, channel.id)
    }

    #[test]
    fn test_post_requires_channel_membership() {
        let fx = setup();
        let (ws, channel) = workspace_with_channel(&fx);

        // Bob in the workspace but not the channel: forbidden
        fx.authority.add_workspace_member(ws.id, fx.bob.id).unwrap();
        let result = fx.log.post(channel, &fx.bob, "hello");
        assert!(matches!(result, Err(MessageError::Forbidden)));

        fx.authority.add_channel_member(channel, fx.bob.id).unwrap();
        let message = fx.log.post(channel, &fx.bob, "hello").unwrap();
        assert_eq!(message.content, "hello");
        assert_eq!(message.author, fx.bob.id);
    }

    #[test]
    fn test_post_rejects_blank_content() {
        let fx = setup();
        let (_ws, channel) = workspace_with_channel(&fx);

        assert!(matches!(
            fx.log.post(channel, &fx.alice, ""),
            Err(MessageError::InvalidContent)
        ));
        assert!(matches!(
            fx.log.post(channel, &fx.alice, "  \n "),
            Err(MessageError::InvalidContent)
        ));
    }

    #[test]
    fn test_post_to_missing_channel() {
        let fx = setup();
        let result = fx.log.post(ChannelId::new(404), &fx.alice, "hello");
        assert!(matches!(result, Err(MessageError::ChannelNotFound)));
    }

    #[tokio::test]
    async fn test_post_broadcasts_normalized_record() {
        let fx = setup();
        let (_ws, channel) = workspace_with_channel(&fx);

        let mut rx = fx.broadcaster.subscribe(Topic::Channel(channel));
        let message = fx.log.post(channel, &fx.alice, "hello").unwrap();

        let event = rx.recv().await.unwrap();
        match event {
            EventEnvelope::Message(record) => {
                assert_eq!(record.id, message.id);
                assert_eq!(record.content, "hello");
                assert_eq!(record.author.email, "alice@example.com");
                assert_eq!(record.channel_id, channel);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_edit_is_author_only() {
        let fx = setup();
        let (ws, channel) = workspace_with_channel(&fx);
        fx.authority.add_workspace_member(ws.id, fx.bob.id).unwrap();
        fx.authority.add_channel_member(channel, fx.bob.id).unwrap();

        let message = fx.log.post(channel, &fx.bob, "draft").unwrap();

        // Even the workspace owner may not edit someone else's message
        let result = fx.log.edit(message.id, "hijacked", fx.alice.id);
        assert!(matches!(result, Err(MessageError::Forbidden)));

        let edited = fx.log.edit(message.id, "final", fx.bob.id).unwrap();
        assert_eq!(edited.content, "final");
        assert_eq!(edited.created_at, message.created_at);
    }

    #[test]
    fn test_delete_is_author_only() {
        let fx = setup();
        let (ws, channel) = workspace_with_channel(&fx);
        fx.authority.add_workspace_member(ws.id, fx.bob.id).unwrap();
        fx.authority.add_channel_member(channel, fx.bob.id).unwrap();

        let message = fx.log.post(channel, &fx.bob, "mine").unwrap();

        let result = fx.log.delete(message.id, fx.alice.id);
        assert!(matches!(result, Err(MessageError::Forbidden)));

        fx.log.delete(message.id, fx.bob.id).unwrap();
        let result = fx.log.delete(message.id, fx.bob.id);
        assert!(matches!(result, Err(MessageError::MessageNotFound)));
    }

    #[test]
    fn test_list_requires_channel_membership() {
        let fx = setup();
        let (ws, channel) = workspace_with_channel(&fx);
        fx.log.post(channel, &fx.alice, "hello").unwrap();

        fx.authority.add_workspace_member(ws.id, fx.bob.id).unwrap();
        let result = fx.log.list(channel, fx.bob.id, 1, 50);
        assert!(matches!(result, Err(MessageError::Forbidden)));

        fx.authority.add_channel_member(channel, fx.bob.id).unwrap();
        let messages = fx.log.list(channel, fx.bob.id, 1, 50).unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_list_pages_are_ordered_and_restartable() {
        let fx = setup();
        let (_ws, channel) = workspace_with_channel(&fx);

        for i in 0..5 {
            fx.log
                .post(channel, &fx.alice, &format!("m{}", i))
                .unwrap();
        }

        let page1 = fx.log.list(channel, fx.alice.id, 1, 2).unwrap();
        let page2 = fx.log.list(channel, fx.alice.id, 2, 2).unwrap();
        let page1_again = fx.log.list(channel, fx.alice.id, 1, 2).unwrap();

        assert_eq!(
            page1.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["m0", "m1"]
        );
        assert_eq!(
            page2.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["m2", "m3"]
        );
        assert_eq!(page1, page1_again);

        // Ids are strictly increasing in posting order
        let all = fx.log.list(channel, fx.alice.id, 1, 50).unwrap();
        for pair in all.windows(2) {
            assert!(pair[0].id.as_i64() < pair[1].id.as_i64());
        }
    }

    #[test]
    fn test_zero_page_and_limit_are_clamped() {
        let fx = setup();
        let (_ws, channel) = workspace_with_channel(&fx);
        fx.log.post(channel, &fx.alice, "hello").unwrap();

        let messages = fx.log.list(channel, fx.alice.id, 0, 0).unwrap();
        assert_eq!(messages.len(), 1);
    }
}
