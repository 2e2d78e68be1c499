//! Durable storage for workspaces, channels, and messages

pub mod migrations;
pub mod sql_store;

pub use sql_store::{ChannelMemberAdd, ChatStore, StorageError, WorkspaceMemberAdd};
