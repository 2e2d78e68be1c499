//! Workspace & channel management
//!
//! Core data structures and operations for workspaces and channels,
//! plus the membership authority that guards them.
//!
//! Two invariants hold after every operation sequence:
//!
//! 1. A workspace's owner is always one of its members.
//! 2. A channel's members are a subset of its workspace's members;
//!    losing workspace membership cascades to channel membership.

pub mod authority;
pub mod channel;
pub mod directory;
pub mod storage;
pub mod types;
pub mod workspace;

pub use authority::{MembershipAuthority, MembershipError};
pub use channel::Channel;
pub use directory::{ChannelDirectory, ChannelSummary, DirectoryError};
pub use storage::{ChatStore, StorageError};
pub use types::{ChannelId, MessageId, Timestamp, UserId, WorkspaceId};
pub use workspace::{MembershipChange, Workspace, WorkspaceError};
