//! Command-level error taxonomy
//!
//! Every inbound command either fully succeeds or fails with exactly
//! one of these kinds; protocol layers map them to status codes.

use crate::core_message::MessageError;
use crate::core_presence::PresenceError;
use crate::core_workspace::{DirectoryError, MembershipError, StorageError};

/// One error kind per failed command
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("workspace not found")]
    WorkspaceNotFound,

    #[error("channel not found")]
    ChannelNotFound,

    #[error("message not found")]
    MessageNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cannot remove workspace owner")]
    OwnerRemovalForbidden,

    #[error("user is not a member of the channel's workspace")]
    NotWorkspaceMember,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<MembershipError> for ChatError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::WorkspaceNotFound => ChatError::WorkspaceNotFound,
            MembershipError::ChannelNotFound => ChatError::ChannelNotFound,
            MembershipError::OwnerRemovalForbidden => ChatError::OwnerRemovalForbidden,
            MembershipError::NotWorkspaceMember => ChatError::NotWorkspaceMember,
            MembershipError::Storage(e) => ChatError::Storage(e),
        }
    }
}

impl From<DirectoryError> for ChatError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::WorkspaceNotFound => ChatError::WorkspaceNotFound,
            DirectoryError::ChannelNotFound => ChatError::ChannelNotFound,
            DirectoryError::Forbidden => ChatError::Forbidden,
            DirectoryError::InvalidName => ChatError::InvalidInput("invalid name".to_string()),
            DirectoryError::Storage(e) => ChatError::Storage(e),
        }
    }
}

impl From<MessageError> for ChatError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::ChannelNotFound => ChatError::ChannelNotFound,
            MessageError::MessageNotFound => ChatError::MessageNotFound,
            MessageError::Forbidden => ChatError::Forbidden,
            MessageError::InvalidContent => {
                ChatError::InvalidInput("message content must not be empty".to_string())
            }
            MessageError::Storage(e) => ChatError::Storage(e),
        }
    }
}

impl From<PresenceError> for ChatError {
    fn from(err: PresenceError) -> Self {
        match err {
            PresenceError::ChannelNotFound => ChatError::ChannelNotFound,
            PresenceError::Forbidden => ChatError::Forbidden,
            PresenceError::Storage(e) => ChatError::Storage(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_error_mapping() {
        assert!(matches!(
            ChatError::from(MembershipError::OwnerRemovalForbidden),
            ChatError::OwnerRemovalForbidden
        ));
        assert!(matches!(
            ChatError::from(MembershipError::NotWorkspaceMember),
            ChatError::NotWorkspaceMember
        ));
    }

    #[test]
    fn test_invalid_input_carries_reason() {
        let err = ChatError::from(DirectoryError::InvalidName);
        assert_eq!(err.to_string(), "invalid input: invalid name");
    }
}
