//! Inbound command service
//!
//! One method per inbound command from the protocol layer, each
//! already authenticated to a concrete user id. Authorization and
//! validation run before any mutation; a command either fully
//! succeeds or fails with exactly one [`ChatError`] kind.

use crate::config::Config;
use crate::core_events::EventBroadcaster;
use crate::core_message::{Message, MessageLog, MessageRecord};
use crate::core_presence::{PresenceTracker, TypingSignal};
use crate::core_users::{UserDirectory, UserRecord};
use crate::core_workspace::{
    ChannelDirectory, ChannelId, ChannelSummary, ChatStore, MembershipAuthority,
    MembershipChange, MessageId, Timestamp, UserId, Workspace, WorkspaceId,
};
use crate::core_workspace::directory::MAX_NAME_LEN;
use crate::core_workspace::Channel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

mod error;

pub use error::ChatError;

/// A member referenced by the caller, either directly by id or by the
/// email the directory resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRef {
    Id(UserId),
    Email(String),
}

/// Result of an idempotent member-add command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAddOutcome {
    pub status: MembershipChange,
    pub user_id: UserId,
}

/// The chat core behind one façade: membership, channels, messages,
/// presence, and event fan-out wired together over a shared store.
pub struct ChatService {
    store: Arc<ChatStore>,
    authority: Arc<MembershipAuthority>,
    channels: ChannelDirectory,
    messages: MessageLog,
    presence: PresenceTracker,
    broadcaster: Arc<EventBroadcaster>,
    users: Arc<dyn UserDirectory>,
}

impl ChatService {
    /// Wire the core together over a store and a user directory
    pub fn new(store: Arc<ChatStore>, users: Arc<dyn UserDirectory>, config: &Config) -> Self {
        let broadcaster = Arc::new(EventBroadcaster::new(config.events.capacity));
        let authority = Arc::new(MembershipAuthority::new(
            store.clone(),
            config.features.auto_join_channels,
        ));
        let channels = ChannelDirectory::new(store.clone(), authority.clone());
        let messages = MessageLog::new(store.clone(), authority.clone(), broadcaster.clone());
        let presence = PresenceTracker::new(
            authority.clone(),
            broadcaster.clone(),
            config.presence.typing_ttl,
        );

        Self {
            store,
            authority,
            channels,
            messages,
            presence,
            broadcaster,
            users,
        }
    }

    /// The membership authority, for callers that gate subscriptions
    pub fn authority(&self) -> &Arc<MembershipAuthority> {
        &self.authority
    }

    /// The event broadcaster, for callers that open subscriptions
    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    /// The presence tracker
    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    fn require_user(&self, actor: UserId) -> Result<UserRecord, ChatError> {
        self.users.get(actor).ok_or(ChatError::UserNotFound)
    }

    fn resolve_member(&self, member: &MemberRef) -> Result<UserRecord, ChatError> {
        match member {
            MemberRef::Id(id) => self.users.get(*id).ok_or(ChatError::UserNotFound),
            MemberRef::Email(email) => self
                .users
                .find_by_email(email)
                .ok_or(ChatError::UserNotFound),
        }
    }

    fn validate_name(name: &str) -> Result<&str, ChatError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_NAME_LEN {
            return Err(ChatError::InvalidInput("invalid name".to_string()));
        }
        Ok(trimmed)
    }

    // ===== Workspace commands =====

    /// Create a workspace owned by the actor
    pub fn create_workspace(&self, actor: UserId, name: &str) -> Result<Workspace, ChatError> {
        self.require_user(actor)?;
        let name = Self::validate_name(name)?;

        let workspace = self.store.create_workspace(name, actor, Timestamp::now())?;
        info!(workspace = %workspace.id, owner = %actor, "workspace created");
        Ok(workspace)
    }

    /// List the workspaces the actor is a member of
    pub fn list_workspaces(&self, actor: UserId) -> Result<Vec<Workspace>, ChatError> {
        self.require_user(actor)?;
        Ok(self.store.list_workspaces_for(actor)?)
    }

    /// Fetch a workspace the actor can view
    pub fn get_workspace(
        &self,
        actor: UserId,
        workspace: WorkspaceId,
    ) -> Result<Workspace, ChatError> {
        if !self.authority.can_view(actor, workspace)? {
            return Err(ChatError::Forbidden);
        }
        self.store
            .get_workspace(workspace)?
            .ok_or(ChatError::WorkspaceNotFound)
    }

    /// Rename a workspace. Owner only.
    pub fn rename_workspace(
        &self,
        actor: UserId,
        workspace: WorkspaceId,
        name: &str,
    ) -> Result<Workspace, ChatError> {
        let name = Self::validate_name(name)?;
        if !self.authority.is_owner(actor, workspace)? {
            return Err(ChatError::Forbidden);
        }

        self.store.rename_workspace(workspace, name)?;
        self.store
            .get_workspace(workspace)?
            .ok_or(ChatError::WorkspaceNotFound)
    }

    /// Delete a workspace and everything beneath it. Owner only.
    pub fn delete_workspace(&self, actor: UserId, workspace: WorkspaceId) -> Result<(), ChatError> {
        if !self.authority.is_owner(actor, workspace)? {
            return Err(ChatError::Forbidden);
        }

        self.store.delete_workspace(workspace)?;
        info!(%workspace, "workspace deleted");
        Ok(())
    }

    // ===== Workspace membership commands =====

    /// Add a member to a workspace. Owner only; idempotent.
    pub fn add_workspace_member(
        &self,
        actor: UserId,
        workspace: WorkspaceId,
        member: &MemberRef,
    ) -> Result<MemberAddOutcome, ChatError> {
        if !self.authority.is_owner(actor, workspace)? {
            return Err(ChatError::Forbidden);
        }

        let user = self.resolve_member(member)?;
        let status = self.authority.add_workspace_member(workspace, user.id)?;
        Ok(MemberAddOutcome {
            status,
            user_id: user.id,
        })
    }

    /// Remove a member from a workspace, cascading out of its
    /// channels. Owner only; the owner itself can never be removed.
    pub fn remove_workspace_member(
        &self,
        actor: UserId,
        workspace: WorkspaceId,
        member: UserId,
    ) -> Result<(), ChatError> {
        if !self.authority.is_owner(actor, workspace)? {
            return Err(ChatError::Forbidden);
        }
        if !self.users.exists(member) {
            return Err(ChatError::UserNotFound);
        }

        self.authority.remove_workspace_member(workspace, member)?;
        Ok(())
    }

    /// List a workspace's members for a viewer
    pub fn list_workspace_members(
        &self,
        actor: UserId,
        workspace: WorkspaceId,
    ) -> Result<Vec<UserId>, ChatError> {
        if !self.authority.can_view(actor, workspace)? {
            return Err(ChatError::Forbidden);
        }
        let ws = self
            .store
            .get_workspace(workspace)?
            .ok_or(ChatError::WorkspaceNotFound)?;
        let mut members: Vec<UserId> = ws.members.into_iter().collect();
        members.sort();
        Ok(members)
    }

    // ===== Channel commands =====

    /// Create a channel in a workspace. Owner only.
    pub fn create_channel(
        &self,
        actor: UserId,
        workspace: WorkspaceId,
        name: &str,
    ) -> Result<Channel, ChatError> {
        self.require_user(actor)?;
        Ok(self.channels.create(workspace, name, actor)?)
    }

    /// Rename a channel. Owner of its workspace only.
    pub fn rename_channel(
        &self,
        actor: UserId,
        channel: ChannelId,
        name: &str,
    ) -> Result<Channel, ChatError> {
        Ok(self.channels.rename(channel, name, actor)?)
    }

    /// Delete a channel and its messages. Owner only.
    pub fn delete_channel(&self, actor: UserId, channel: ChannelId) -> Result<(), ChatError> {
        Ok(self.channels.delete(channel, actor)?)
    }

    /// List a workspace's channels with per-entry membership flags
    pub fn list_channels(
        &self,
        actor: UserId,
        workspace: WorkspaceId,
    ) -> Result<Vec<ChannelSummary>, ChatError> {
        Ok(self.channels.list(workspace, actor)?)
    }

    /// Fetch a channel the actor is a member of
    pub fn get_channel(&self, actor: UserId, channel: ChannelId) -> Result<Channel, ChatError> {
        if !self.authority.can_view_channel(actor, channel)? {
            return Err(ChatError::Forbidden);
        }
        self.store
            .get_channel(channel)?
            .ok_or(ChatError::ChannelNotFound)
    }

    /// Parent workspace of a channel (routing support for protocol
    /// layers with workspace-nested paths)
    pub fn channel_workspace(&self, channel: ChannelId) -> Result<WorkspaceId, ChatError> {
        self.store
            .channel_workspace(channel)?
            .ok_or(ChatError::ChannelNotFound)
    }

    // ===== Channel membership commands =====

    /// Add a member to a channel. Owner of the channel's workspace
    /// only; the member must already belong to the workspace.
    pub fn add_channel_member(
        &self,
        actor: UserId,
        channel: ChannelId,
        member: &MemberRef,
    ) -> Result<MemberAddOutcome, ChatError> {
        let workspace = self
            .store
            .channel_workspace(channel)?
            .ok_or(ChatError::ChannelNotFound)?;
        if !self.authority.is_owner(actor, workspace)? {
            return Err(ChatError::Forbidden);
        }

        let user = self.resolve_member(member)?;
        let status = self.authority.add_channel_member(channel, user.id)?;
        Ok(MemberAddOutcome {
            status,
            user_id: user.id,
        })
    }

    /// Remove a member from a channel. Owner only; idempotent.
    pub fn remove_channel_member(
        &self,
        actor: UserId,
        channel: ChannelId,
        member: UserId,
    ) -> Result<(), ChatError> {
        let workspace = self
            .store
            .channel_workspace(channel)?
            .ok_or(ChatError::ChannelNotFound)?;
        if !self.authority.is_owner(actor, workspace)? {
            return Err(ChatError::Forbidden);
        }
        if !self.users.exists(member) {
            return Err(ChatError::UserNotFound);
        }

        self.authority.remove_channel_member(channel, member)?;
        Ok(())
    }

    // ===== Message commands =====

    /// Post a message to a channel the actor is a member of
    pub fn post_message(
        &self,
        actor: UserId,
        channel: ChannelId,
        content: &str,
    ) -> Result<Message, ChatError> {
        let author = self.require_user(actor)?;
        Ok(self.messages.post(channel, &author, content)?)
    }

    /// Edit a message. Author only.
    pub fn edit_message(
        &self,
        actor: UserId,
        message: MessageId,
        content: &str,
    ) -> Result<Message, ChatError> {
        Ok(self.messages.edit(message, content, actor)?)
    }

    /// Delete a message. Author only.
    pub fn delete_message(&self, actor: UserId, message: MessageId) -> Result<(), ChatError> {
        Ok(self.messages.delete(message, actor)?)
    }

    /// Fetch one message, gated by channel visibility
    pub fn get_message(&self, actor: UserId, message: MessageId) -> Result<Message, ChatError> {
        Ok(self.messages.get(message, actor)?)
    }

    /// Channel a message belongs to (routing support, no content)
    pub fn message_channel(&self, message: MessageId) -> Result<ChannelId, ChatError> {
        self.store
            .get_message(message)?
            .map(|m| m.channel_id)
            .ok_or(ChatError::MessageNotFound)
    }

    /// List a page of channel messages, normalized for the wire
    pub fn list_messages(
        &self,
        actor: UserId,
        channel: ChannelId,
        page: u32,
        limit: u32,
    ) -> Result<Vec<MessageRecord>, ChatError> {
        let messages = self.messages.list(channel, actor, page, limit)?;
        Ok(messages.iter().map(|m| self.normalize_message(m)).collect())
    }

    /// Normalize a message with its author's directory record
    pub fn normalize_message(&self, message: &Message) -> MessageRecord {
        let author = self.users.get(message.author).unwrap_or(UserRecord {
            id: message.author,
            email: String::new(),
            username: String::new(),
        });
        message.normalize(&author)
    }

    // ===== Presence commands =====

    /// Record a typing signal for the actor in a channel
    pub fn signal_typing(&self, actor: UserId, channel: ChannelId) -> Result<(), ChatError> {
        let user = self.require_user(actor)?;
        Ok(self.presence.signal(channel, &user)?)
    }

    /// Who is currently typing in a channel the actor can view
    pub fn typing_in(
        &self,
        actor: UserId,
        channel: ChannelId,
    ) -> Result<Vec<TypingSignal>, ChatError> {
        if !self.authority.can_view_channel(actor, channel)? {
            return Err(ChatError::Forbidden);
        }
        Ok(self.presence.typing_in(channel))
    }
}
