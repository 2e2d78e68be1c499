//! Workspace data structure and membership operations

use super::types::{Timestamp, UserId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of an idempotent membership mutation.
///
/// Adding a member who is already present is not an error; callers get
/// an explicit status instead so repeated calls converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipChange {
    /// The member was newly added
    Added,
    /// The member was already present, nothing changed
    AlreadyMember,
}

/// A workspace is the top-level tenant grouping: one owner, a member
/// set that always contains the owner, and a set of channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique identifier
    pub id: WorkspaceId,

    /// Human-readable name
    pub name: String,

    /// Owner of the workspace (always also a member)
    pub owner_id: UserId,

    /// Workspace members, owner included
    pub members: HashSet<UserId>,

    /// When the workspace was created
    pub created_at: Timestamp,
}

impl Workspace {
    /// Create a new workspace. The owner is enrolled as a member
    /// immediately so the owner-is-member invariant holds from birth.
    pub fn new(id: WorkspaceId, name: String, owner_id: UserId, created_at: Timestamp) -> Self {
        let mut members = HashSet::new();
        members.insert(owner_id);

        Workspace {
            id,
            name,
            owner_id,
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

    /// Remove a member; idempotent, but the owner can never be removed
    pub fn remove_member(&mut self, user_id: UserId) -> Result<bool, WorkspaceError> {
        if user_id == self.owner_id {
            return Err(WorkspaceError::OwnerRemovalForbidden);
        }
        Ok(self.members.remove(&user_id))
    }

    /// Check if a user is a member
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }

    /// Check if a user is the owner
    pub fn is_owner(&self, user_id: UserId) -> bool {
        user_id == self.owner_id
    }

    /// Get the number of members
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Workspace operation errors
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("cannot remove the workspace owner from its own workspace")]
    OwnerRemovalForbidden,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> Workspace {
        Workspace::new(
            WorkspaceId::new(1),
            "Engineering".to_string(),
            UserId::new(10),
            Timestamp::from_millis(1_000),
        )
    }

    #[test]
    fn test_owner_is_member_from_creation() {
        let ws = workspace();
        assert!(ws.is_member(UserId::new(10)));
        assert!(ws.is_owner(UserId::new(10)));
        assert_eq!(ws.member_count(), 1);
    }

    #[test]
    fn test_add_member_idempotent() {
        let mut ws = workspace();
        let bob = UserId::new(11);

        assert_eq!(ws.add_member(bob), MembershipChange::Added);
        assert_eq!(ws.add_member(bob), MembershipChange::AlreadyMember);
        assert_eq!(ws.member_count(), 2);
    }

    #[test]
    fn test_remove_member() {
        let mut ws = workspace();
        let bob = UserId::new(11);
        ws.add_member(bob);

        assert_eq!(ws.remove_member(bob).unwrap(), true);
        assert!(!ws.is_member(bob));
        // Removing again is a no-op, not an error
        assert_eq!(ws.remove_member(bob).unwrap(), false);
    }

    #[test]
    fn test_cannot_remove_owner() {
        let mut ws = workspace();
        let result = ws.remove_member(UserId::new(10));
        assert!(matches!(result, Err(WorkspaceError::OwnerRemovalForbidden)));
        assert!(ws.is_member(UserId::new(10)));
    }
}
