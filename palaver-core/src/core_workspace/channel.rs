//! Channel data structure and membership operations

use super::types::{ChannelId, Timestamp, UserId, WorkspaceId};
use super::workspace::MembershipChange;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A channel is a sub-space of a workspace with its own, stricter
/// member set. Channel members must also be workspace members; that
/// subset invariant is enforced by the membership authority at the
/// write boundary, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Unique identifier
    pub id: ChannelId,

    /// Parent workspace (immutable after creation)
    pub workspace_id: WorkspaceId,

    /// Human-readable name
    pub name: String,

    /// Members of this channel (subset of workspace members)
    pub members: HashSet<UserId>,

    /// When the channel was created
    pub created_at: Timestamp,
}

impl Channel {
    /// Create a new channel with the creator as its sole member
    pub fn new(
        id: ChannelId,
        workspace_id: WorkspaceId,
        name: String,
        creator_id: UserId,
        created_at: Timestamp,
    ) -> Self {
        let mut members = HashSet::new();
        members.insert(creator_id);

        Channel {
            id,
            workspace_id,
            name,
            members,
            created_at,
        }
    }

    /// Add a member; idempotent
    pub fn add_member(&mut self, user_id: UserId) -> MembershipChange {
        if self.members.insert(user_id) {
            MembershipChange::Added
        } else {
            MembershipChange::AlreadyMember
        }
    }

    /// Remove a member; idempotent. Returns whether a member was
    /// actually removed.
    pub fn remove_member(&mut self, user_id: UserId) -> bool {
        self.members.remove(&user_id)
    }

    /// Check if a user is a member of the channel
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    /// Get the number of members in the channel
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
