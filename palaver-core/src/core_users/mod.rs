//! User directory boundary
//!
//! The core resolves user identities through an external directory; it
//! never manages credentials. The trait below is the whole contract:
//! email lookup and id existence. An in-memory implementation ships
//! for the API binary and for tests.

use crate::core_workspace::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

/// A user as known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub username: String,
}

/// Normalize an email for lookup: trimmed, lowercased
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// External identity lookup contract
pub trait UserDirectory: Send + Sync {
    /// Find a user by (normalized) email
    fn find_by_email(&self, email: &str) -> Option<UserRecord>;

    /// Check whether a user id exists
    fn exists(&self, user: UserId) -> bool;

    /// Fetch a user record by id
    fn get(&self, user: UserId) -> Option<UserRecord>;
}

/// Directory registration errors
#[derive(Debug, thiserror::Error)]
pub enum UserDirectoryError {
    #[error("invalid email")]
    InvalidEmail,

    #[error("email already registered")]
    DuplicateEmail,
}

/// In-memory user directory
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserRecord>>,
    by_email: RwLock<HashMap<String, UserId>>,
    next_id: AtomicI64,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            by_email: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Register a new user, assigning the next id
    pub fn register(
        &self,
        email: &str,
        username: &str,
    ) -> Result<UserRecord, UserDirectoryError> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(UserDirectoryError::InvalidEmail);
        }

        let mut by_email = self.by_email.write().unwrap();
        if by_email.contains_key(&email) {
            return Err(UserDirectoryError::DuplicateEmail);
        }

        let id = UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let username = if username.trim().is_empty() {
            email.clone()
        } else {
            username.trim().to_string()
        };
        let record = UserRecord {
            id,
            email: email.clone(),
            username,
        };

        by_email.insert(email, id);
        self.users.write().unwrap().insert(id, record.clone());

        Ok(record)
    }
}

impl Default for InMemoryUserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let email = normalize_email(email);
        let id = *self.by_email.read().unwrap().get(&email)?;
        self.users.read().unwrap().get(&id).cloned()
    }

    fn exists(&self, user: UserId) -> bool {
        self.users.read().unwrap().contains_key(&user)
    }

    fn get(&self, user: UserId) -> Option<UserRecord> {
        self.users.read().unwrap().get(&user).cloned()
    }
}
