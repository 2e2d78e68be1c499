//! Membership authority: the single source of truth for "who may do
//! what" across workspaces and channels.
//!
//! Every other component routes its authorization question through
//! here instead of re-deriving membership logic, so the two invariants
//! (the owner is always a member; channel members are a subset of
//! workspace members) cannot drift between call sites.

use super::storage::{ChannelMemberAdd, ChatStore, StorageError, WorkspaceMemberAdd};
use super::types::{ChannelId, Timestamp, UserId, WorkspaceId};
use super::workspace::MembershipChange;
use std::sync::Arc;
use tracing::debug;

/// Membership operation errors
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    #[error("workspace not found")]
    WorkspaceNotFound,

    #[error("channel not found")]
    ChannelNotFound,

    #[error("cannot remove the workspace owner from its own workspace")]
    OwnerRemovalForbidden,

    #[error("user is not a member of the channel's workspace")]
    NotWorkspaceMember,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Store-backed membership authority
pub struct MembershipAuthority {
    store: Arc<ChatStore>,
    auto_join_channels: bool,
}

impl MembershipAuthority {
    /// Create an authority over the given store. `auto_join_channels`
    /// is the opt-in policy that enrolls a new workspace member into
    /// every existing channel; the default contract keeps channels
    /// locked until an explicit per-channel invitation.
    pub fn new(store: Arc<ChatStore>, auto_join_channels: bool) -> Self {
        Self {
            store,
            auto_join_channels,
        }
    }

    /// True iff the user is a member of the workspace
    pub fn can_view(&self, user: UserId, workspace: WorkspaceId) -> Result<bool, MembershipError> {
        if self.store.workspace_owner(workspace)?.is_none() {
            return Err(MembershipError::WorkspaceNotFound);
        }
        Ok(self.store.is_workspace_member(workspace, user)?)
    }

    /// True iff the user owns the workspace
    pub fn is_owner(&self, user: UserId, workspace: WorkspaceId) -> Result<bool, MembershipError> {
        match self.store.workspace_owner(workspace)? {
            Some(owner) => Ok(owner == user),
            None => Err(MembershipError::WorkspaceNotFound),
        }
    }

    /// True iff the user is a member of the channel's workspace AND of
    /// the channel itself. Both are required: a workspace member
    /// without explicit channel membership is denied.
    pub fn can_view_channel(
        &self,
        user: UserId,
        channel: ChannelId,
    ) -> Result<bool, MembershipError> {
        let workspace = self
            .store
            .channel_workspace(channel)?
            .ok_or(MembershipError::ChannelNotFound)?;

        Ok(self.store.is_workspace_member(workspace, user)?
            && self.store.is_channel_member(channel, user)?)
    }

    /// Add a user to a workspace; idempotent
    pub fn add_workspace_member(
        &self,
        workspace: WorkspaceId,
        user: UserId,
    ) -> Result<MembershipChange, MembershipError> {
        let outcome = self.store.add_workspace_member(
            workspace,
            user,
            Timestamp::now(),
            self.auto_join_channels,
        )?;

        match outcome {
            WorkspaceMemberAdd::Added => {
                debug!(%workspace, %user, "workspace member added");
                Ok(MembershipChange::Added)
            }
            WorkspaceMemberAdd::AlreadyMember => Ok(MembershipChange::AlreadyMember),
            WorkspaceMemberAdd::NoSuchWorkspace => Err(MembershipError::WorkspaceNotFound),
        }
    }

    /// Remove a user from a workspace. The owner can never be removed;
    /// everyone else is removed idempotently, cascading out of every
    /// channel of the workspace so the subset invariant keeps holding.
    pub fn remove_workspace_member(
        &self,
        workspace: WorkspaceId,
        user: UserId,
    ) -> Result<(), MembershipError> {
        let owner = self
            .store
            .workspace_owner(workspace)?
            .ok_or(MembershipError::WorkspaceNotFound)?;
        if owner == user {
            return Err(MembershipError::OwnerRemovalForbidden);
        }

        let removed = self.store.remove_workspace_member(workspace, user)?;
        if removed {
            debug!(%workspace, %user, "workspace member removed");
        }
        Ok(())
    }

    /// Add a user to a channel; idempotent. Fails when the user is not
    /// a member of the channel's workspace — the subset invariant is
    /// enforced at this write boundary, not by post-hoc checks.
    pub fn add_channel_member(
        &self,
        channel: ChannelId,
        user: UserId,
    ) -> Result<MembershipChange, MembershipError> {
        let outcome = self
            .store
            .add_channel_member(channel, user, Timestamp::now())?;

        match outcome {
            ChannelMemberAdd::Added => {
                debug!(%channel, %user, "channel member added");
                Ok(MembershipChange::Added)
            }
            ChannelMemberAdd::AlreadyMember => Ok(MembershipChange::AlreadyMember),
            ChannelMemberAdd::NotWorkspaceMember => Err(MembershipError::NotWorkspaceMember),
            ChannelMemberAdd::NoSuchChannel => Err(MembershipError::ChannelNotFound),
        }
    }

    /// Remove a user from a channel; idempotent
    pub fn remove_channel_member(
        &self,
        channel: ChannelId,
        user: UserId,
    ) -> Result<(), MembershipError> {
        if self.store.channel_workspace(channel)?.is_none() {
            return Err(MembershipError::ChannelNotFound);
        }

        self.store.remove_channel_member(channel, user)?;
        Ok(())
    }
}
