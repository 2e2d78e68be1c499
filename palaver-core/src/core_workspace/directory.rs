//! Channel directory: channel lifecycle scoped to a workspace
//!
//! Creation, rename, and deletion are owner-only operations. Deletion
//! is an explicit ordered routine (messages first, then the channel)
//! rather than a storage-engine cascade, so the order is deterministic
//! and auditable.

use super::authority::{MembershipAuthority, MembershipError};
use super::channel::Channel;
use super::storage::{ChatStore, StorageError};
use super::types::{ChannelId, Timestamp, UserId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Longest accepted workspace/channel name
pub const MAX_NAME_LEN: usize = 255;

/// Channel directory errors
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("workspace not found")]
    WorkspaceNotFound,

    #[error("channel not found")]
    ChannelNotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid name")]
    InvalidName,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<MembershipError> for DirectoryError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::WorkspaceNotFound => DirectoryError::WorkspaceNotFound,
            MembershipError::ChannelNotFound => DirectoryError::ChannelNotFound,
            MembershipError::Storage(e) => DirectoryError::Storage(e),
            MembershipError::OwnerRemovalForbidden | MembershipError::NotWorkspaceMember => {
                DirectoryError::Forbidden
            }
        }
    }
}

/// A channel as seen by a listing user: locked channels stay visible,
/// but the `is_member` flag tells whether their content is readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub id: ChannelId,
    pub workspace_id: WorkspaceId,
    pub name: String,
    pub created_at: Timestamp,
    pub is_member: bool,
}

/// Workspace-scoped channel lifecycle
pub struct ChannelDirectory {
    store: Arc<ChatStore>,
    authority: Arc<MembershipAuthority>,
}

impl ChannelDirectory {
    pub fn new(store: Arc<ChatStore>, authority: Arc<MembershipAuthority>) -> Self {
        Self { store, authority }
    }

    /// Validate a channel name: non-blank, bounded length
    fn validate_name(name: &str) -> Result<&str, DirectoryError> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_NAME_LEN {
            return Err(DirectoryError::InvalidName);
        }
        Ok(trimmed)
    }

    /// Create a channel. Owner-only; the creator is pre-added as the
    /// channel's sole member so an owner creating a channel can use it
    /// immediately.
    pub fn create(
        &self,
        workspace: WorkspaceId,
        name: &str,
        creator: UserId,
    ) -> Result<Channel, DirectoryError> {
        let name = Self::validate_name(name)?;

        if !self.authority.is_owner(creator, workspace)? {
            return Err(DirectoryError::Forbidden);
        }

        let channel = self
            .store
            .create_channel(workspace, name, creator, Timestamp::now())?;
        info!(channel = %channel.id, %workspace, "channel created");
        Ok(channel)
    }

    /// Rename a channel. Owner of the channel's workspace only.
    pub fn rename(
        &self,
        channel: ChannelId,
        new_name: &str,
        actor: UserId,
    ) -> Result<Channel, DirectoryError> {
        let new_name = Self::validate_name(new_name)?;

        let workspace = self
            .store
            .channel_workspace(channel)?
            .ok_or(DirectoryError::ChannelNotFound)?;
        if !self.authority.is_owner(actor, workspace)? {
            return Err(DirectoryError::Forbidden);
        }

        if !self.store.rename_channel(channel, new_name)? {
            return Err(DirectoryError::ChannelNotFound);
        }

        self.store
            .get_channel(channel)?
            .ok_or(DirectoryError::ChannelNotFound)
    }

    /// Delete a channel and its messages, messages first. Owner only.
    pub fn delete(&self, channel: ChannelId, actor: UserId) -> Result<(), DirectoryError> {
        let workspace = self
            .store
            .channel_workspace(channel)?
            .ok_or(DirectoryError::ChannelNotFound)?;
        if !self.authority.is_owner(actor, workspace)? {
            return Err(DirectoryError::Forbidden);
        }

        self.store.delete_channel(channel)?;
        info!(%channel, %workspace, "channel deleted");
        Ok(())
    }

    /// List all channels of a workspace for a member. Every channel is
    /// returned — locked channels included — with a per-entry
    /// `is_member` flag computed with the channel-view rule.
    pub fn list(
        &self,
        workspace: WorkspaceId,
        user: UserId,
    ) -> Result<Vec<ChannelSummary>, DirectoryError> {
        if !self.authority.can_view(user, workspace)? {
            return Err(DirectoryError::Forbidden);
        }

        let channels = self.store.list_channels(workspace)?;
        Ok(channels
            .into_iter()
            .map(|channel| ChannelSummary {
                id: channel.id,
                workspace_id: channel.workspace_id,
                name: channel.name,
                created_at: channel.created_at,
                is_member: channel.members.contains(&user),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Arc<ChatStore>, Arc<MembershipAuthority>, ChannelDirectory) {
        let store = Arc::new(ChatStore::memory().unwrap());
        let authority = Arc::new(MembershipAuthority::new(store.clone(), false));
        let directory = ChannelDirectory::new(store.clone(), authority.clone());
        (store, authority, directory)
    }

    #[test]
    fn test_create_requires_owner() {
        let (store, authority, directory) = setup();
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let ws = store
            .create_workspace("Engineering", alice, Timestamp::now())
            .unwrap();
        authority.add_workspace_member(ws.id, bob).unwrap();

        let result = directory.create(ws.id, "general", bob);
        assert!(matches!(result, Err(DirectoryError::Forbidden)));

        let channel = directory.create(ws.id, "general", alice).unwrap();
        assert!(channel.is_member(alice));
        assert_eq!(channel.member_count(), 1);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let (store, _authority, directory) = setup();
        let alice = UserId::new(1);
        let ws = store
            .create_workspace("Engineering", alice, Timestamp::now())
            .unwrap();

        assert!(matches!(
            directory.create(ws.id, "", alice),
            Err(DirectoryError::InvalidName)
        ));
        assert!(matches!(
            directory.create(ws.id, "   ", alice),
            Err(DirectoryError::InvalidName)
        ));
    }

    #[test]
    fn test_rename_requires_owner() {
        let (store, authority, directory) = setup();
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let ws = store
            .create_workspace("Engineering", alice, Timestamp::now())
            .unwrap();
        authority.add_workspace_member(ws.id, bob).unwrap();
        let channel = directory.create(ws.id, "general", alice).unwrap();

        assert!(matches!(
            directory.rename(channel.id, "announcements", bob),
            Err(DirectoryError::Forbidden)
        ));

        let renamed = directory.rename(channel.id, "announcements", alice).unwrap();
        assert_eq!(renamed.name, "announcements");
    }

    #[test]
    fn test_delete_removes_messages_first() {
        let (store, _authority, directory) = setup();
        let alice = UserId::new(1);
        let ws = store
            .create_workspace("Engineering", alice, Timestamp::now())
            .unwrap();
        let channel = directory.create(ws.id, "general", alice).unwrap();
        let message = store
            .insert_message(channel.id, alice, "hello", Timestamp::now())
            .unwrap();

        directory.delete(channel.id, alice).unwrap();

        assert!(store.get_channel(channel.id).unwrap().is_none());
        assert!(store.get_message(message.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_channel() {
        let (_store, _authority, directory) = setup();
        let result = directory.delete(ChannelId::new(404), UserId::new(1));
        assert!(matches!(result, Err(DirectoryError::ChannelNotFound)));
    }

    #[test]
    fn test_list_marks_locked_channels() {
        let (store, authority, directory) = setup();
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let ws = store
            .create_workspace("Engineering", alice, Timestamp::now())
            .unwrap();
        authority.add_workspace_member(ws.id, bob).unwrap();
        let general = directory.create(ws.id, "general", alice).unwrap();

        // Bob sees the channel exists but is not a member
        let listing = directory.list(ws.id, bob).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "general");
        assert!(!listing[0].is_member);

        authority.add_channel_member(general.id, bob).unwrap();
        let listing = directory.list(ws.id, bob).unwrap();
        assert!(listing[0].is_member);
    }

    #[test]
    fn test_list_requires_workspace_membership() {
        let (store, _authority, directory) = setup();
        let alice = UserId::new(1);
        let mallory = UserId::new(3);
        let ws = store
            .create_workspace("Engineering", alice, Timestamp::now())
            .unwrap();

        let result = directory.list(ws.id, mallory);
        assert!(matches!(result, Err(DirectoryError::Forbidden)));
    }
}
