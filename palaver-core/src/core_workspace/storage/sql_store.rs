//! SQL-based storage for workspaces, channels, and messages
//!
//! Every mutating operation runs inside a transaction so that
//! invariant checks and the mutation itself cannot interleave with a
//! concurrent conflicting writer. Deletion routines remove children
//! before parents in a deterministic order instead of relying on
//! engine-level cascade.

use super::super::channel::Channel;
use super::super::types::{ChannelId, MessageId, Timestamp, UserId, WorkspaceId};
use super::super::workspace::Workspace;
use crate::core_message::Message;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

/// Storage layer errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Outcome of a workspace-member insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceMemberAdd {
    Added,
    AlreadyMember,
    NoSuchWorkspace,
}

/// Outcome of a channel-member insert. The subset invariant
/// (channel members ⊆ workspace members) is enforced here, inside the
/// same transaction as the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMemberAdd {
    Added,
    AlreadyMember,
    NotWorkspaceMember,
    NoSuchChannel,
}

/// SQL-backed store for all durable chat state
pub struct ChatStore {
    pool: Pool<SqliteConnectionManager>,
}

impl ChatStore {
    /// Create a new store on an existing connection pool, running any
    /// pending migrations.
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Result<Self, rusqlite::Error> {
        super::migrations::migrate(&pool)?;
        Ok(Self { pool })
    }

    /// Open (or create) a store at the given file path
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::new(manager).map_err(|e| StorageError::Pool(e.to_string()))?;
        Self::new(pool).map_err(StorageError::from)
    }

    /// Create a new in-memory store (tests, ephemeral deployments)
    pub fn memory() -> Result<Self, StorageError> {
        // A single connection so every handle sees the same in-memory db
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StorageError::Pool(e.to_string()))?;
        Self::new(pool).map_err(StorageError::from)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool.get().map_err(|e| StorageError::Pool(e.to_string()))
    }

    // ===== Workspace operations =====

    /// Insert a new workspace with its owner enrolled as a member
    pub fn create_workspace(
        &self,
        name: &str,
        owner_id: UserId,
        now: Timestamp,
    ) -> Result<Workspace, StorageError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO workspaces (name, owner_id, created_at) VALUES (?, ?, ?)",
            params![name, owner_id.as_i64(), now.as_millis() as i64],
        )?;
        let id = WorkspaceId::new(tx.last_insert_rowid());

        tx.execute(
            "INSERT INTO workspace_members (workspace_id, user_id, joined_at) VALUES (?, ?, ?)",
            params![id.as_i64(), owner_id.as_i64(), now.as_millis() as i64],
        )?;

        tx.commit()?;

        Ok(Workspace::new(id, name.to_string(), owner_id, now))
    }

    /// Get a workspace by id, members hydrated
    pub fn get_workspace(&self, id: WorkspaceId) -> Result<Option<Workspace>, StorageError> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                "SELECT name, owner_id, created_at FROM workspaces WHERE id = ?",
                params![id.as_i64()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        UserId::new(row.get::<_, i64>(1)?),
                        Timestamp::from_millis(row.get::<_, i64>(2)?.max(0) as u64),
                    ))
                },
            )
            .optional()?;

        let Some((name, owner_id, created_at)) = row else {
            return Ok(None);
        };

        let mut stmt =
            conn.prepare("SELECT user_id FROM workspace_members WHERE workspace_id = ?")?;
        let members = stmt
            .query_map(params![id.as_i64()], |row| {
                Ok(UserId::new(row.get::<_, i64>(0)?))
            })?
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(Some(Workspace {
            id,
            name,
            owner_id,
            members,
            created_at,
        }))
    }

    /// Get a workspace's owner without hydrating the member set
    pub fn workspace_owner(&self, id: WorkspaceId) -> Result<Option<UserId>, StorageError> {
        let conn = self.conn()?;
        let owner = conn
            .query_row(
                "SELECT owner_id FROM workspaces WHERE id = ?",
                params![id.as_i64()],
                |row| Ok(UserId::new(row.get::<_, i64>(0)?)),
            )
            .optional()?;
        Ok(owner)
    }

    /// Rename a workspace; returns whether a row was updated
    pub fn rename_workspace(&self, id: WorkspaceId, name: &str) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE workspaces SET name = ? WHERE id = ?",
            params![name, id.as_i64()],
        )?;
        Ok(updated > 0)
    }

    /// Delete a workspace and everything beneath it, children first:
    /// messages, channel members, channels, workspace members, then the
    /// workspace row. Returns whether a workspace was deleted.
    pub fn delete_workspace(&self, id: WorkspaceId) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM messages WHERE channel_id IN
                 (SELECT id FROM channels WHERE workspace_id = ?)",
            params![id.as_i64()],
        )?;
        tx.execute(
            "DELETE FROM channel_members WHERE channel_id IN
                 (SELECT id FROM channels WHERE workspace_id = ?)",
            params![id.as_i64()],
        )?;
        tx.execute(
            "DELETE FROM channels WHERE workspace_id = ?",
            params![id.as_i64()],
        )?;
        tx.execute(
            "DELETE FROM workspace_members WHERE workspace_id = ?",
            params![id.as_i64()],
        )?;
        let deleted = tx.execute("DELETE FROM workspaces WHERE id = ?", params![id.as_i64()])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    /// List workspaces a user is a member of
    pub fn list_workspaces_for(&self, user_id: UserId) -> Result<Vec<Workspace>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT workspace_id FROM workspace_members WHERE user_id = ? ORDER BY workspace_id",
        )?;
        let ids = stmt
            .query_map(params![user_id.as_i64()], |row| {
                Ok(WorkspaceId::new(row.get::<_, i64>(0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        let mut workspaces = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(ws) = self.get_workspace(id)? {
                workspaces.push(ws);
            }
        }
        Ok(workspaces)
    }

    /// Add a user to a workspace; idempotent. With `auto_join_channels`
    /// the new member is also enrolled into every existing channel of
    /// the workspace within the same transaction.
    pub fn add_workspace_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
        now: Timestamp,
        auto_join_channels: bool,
    ) -> Result<WorkspaceMemberAdd, StorageError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM workspaces WHERE id = ?",
                params![workspace_id.as_i64()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Ok(WorkspaceMemberAdd::NoSuchWorkspace);
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO workspace_members (workspace_id, user_id, joined_at)
                 VALUES (?, ?, ?)",
            params![
                workspace_id.as_i64(),
                user_id.as_i64(),
                now.as_millis() as i64
            ],
        )?;

        if inserted > 0 && auto_join_channels {
            tx.execute(
                "INSERT OR IGNORE INTO channel_members (channel_id, user_id, joined_at)
                     SELECT id, ?, ? FROM channels WHERE workspace_id = ?",
                params![
                    user_id.as_i64(),
                    now.as_millis() as i64,
                    workspace_id.as_i64()
                ],
            )?;
        }

        tx.commit()?;

        Ok(if inserted > 0 {
            WorkspaceMemberAdd::Added
        } else {
            WorkspaceMemberAdd::AlreadyMember
        })
    }

    /// Remove a user from a workspace, cascading out of every channel
    /// of that workspace in the same transaction. Idempotent; returns
    /// whether a membership row was removed. Owner protection is the
    /// caller's business rule.
    pub fn remove_workspace_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM channel_members WHERE user_id = ? AND channel_id IN
                 (SELECT id FROM channels WHERE workspace_id = ?)",
            params![user_id.as_i64(), workspace_id.as_i64()],
        )?;
        let removed = tx.execute(
            "DELETE FROM workspace_members WHERE workspace_id = ? AND user_id = ?",
            params![workspace_id.as_i64(), user_id.as_i64()],
        )?;

        tx.commit()?;
        Ok(removed > 0)
    }

    /// Check workspace membership
    pub fn is_workspace_member(
        &self,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM workspace_members WHERE workspace_id = ? AND user_id = ?",
                params![workspace_id.as_i64(), user_id.as_i64()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(found)
    }

    // ===== Channel operations =====

    /// Insert a new channel with its creator as sole member
    pub fn create_channel(
        &self,
        workspace_id: WorkspaceId,
        name: &str,
        creator_id: UserId,
        now: Timestamp,
    ) -> Result<Channel, StorageError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO channels (workspace_id, name, created_at) VALUES (?, ?, ?)",
            params![workspace_id.as_i64(), name, now.as_millis() as i64],
        )?;
        let id = ChannelId::new(tx.last_insert_rowid());

        tx.execute(
            "INSERT INTO channel_members (channel_id, user_id, joined_at) VALUES (?, ?, ?)",
            params![id.as_i64(), creator_id.as_i64(), now.as_millis() as i64],
        )?;

        tx.commit()?;

        Ok(Channel::new(id, workspace_id, name.to_string(), creator_id, now))
    }

    /// Get a channel by id, members hydrated
    pub fn get_channel(&self, id: ChannelId) -> Result<Option<Channel>, StorageError> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                "SELECT workspace_id, name, created_at FROM channels WHERE id = ?",
                params![id.as_i64()],
                |row| {
                    Ok((
                        WorkspaceId::new(row.get::<_, i64>(0)?),
                        row.get::<_, String>(1)?,
                        Timestamp::from_millis(row.get::<_, i64>(2)?.max(0) as u64),
                    ))
                },
            )
            .optional()?;

        let Some((workspace_id, name, created_at)) = row else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT user_id FROM channel_members WHERE channel_id = ?")?;
        let members = stmt
            .query_map(params![id.as_i64()], |row| {
                Ok(UserId::new(row.get::<_, i64>(0)?))
            })?
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(Some(Channel {
            id,
            workspace_id,
            name,
            members,
            created_at,
        }))
    }

    /// Get a channel's parent workspace id without hydrating members
    pub fn channel_workspace(&self, id: ChannelId) -> Result<Option<WorkspaceId>, StorageError> {
        let conn = self.conn()?;
        let workspace = conn
            .query_row(
                "SELECT workspace_id FROM channels WHERE id = ?",
                params![id.as_i64()],
                |row| Ok(WorkspaceId::new(row.get::<_, i64>(0)?)),
            )
            .optional()?;
        Ok(workspace)
    }

    /// Rename a channel; returns whether a row was updated
    pub fn rename_channel(&self, id: ChannelId, name: &str) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE channels SET name = ? WHERE id = ?",
            params![name, id.as_i64()],
        )?;
        Ok(updated > 0)
    }

    /// Delete a channel, children first: messages, channel members,
    /// then the channel row. Returns whether a channel was deleted.
    pub fn delete_channel(&self, id: ChannelId) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM messages WHERE channel_id = ?",
            params![id.as_i64()],
        )?;
        tx.execute(
            "DELETE FROM channel_members WHERE channel_id = ?",
            params![id.as_i64()],
        )?;
        let deleted = tx.execute("DELETE FROM channels WHERE id = ?", params![id.as_i64()])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    /// List all channels of a workspace in creation order
    pub fn list_channels(&self, workspace_id: WorkspaceId) -> Result<Vec<Channel>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id FROM channels WHERE workspace_id = ? ORDER BY created_at, id")?;
        let ids = stmt
            .query_map(params![workspace_id.as_i64()], |row| {
                Ok(ChannelId::new(row.get::<_, i64>(0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        let mut channels = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(channel) = self.get_channel(id)? {
                channels.push(channel);
            }
        }
        Ok(channels)
    }

    /// Add a user to a channel; idempotent. The subset invariant is
    /// checked against the workspace member table inside the same
    /// transaction as the insert.
    pub fn add_channel_member(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
        now: Timestamp,
    ) -> Result<ChannelMemberAdd, StorageError> {
        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let workspace_id: Option<i64> = tx
            .query_row(
                "SELECT workspace_id FROM channels WHERE id = ?",
                params![channel_id.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(workspace_id) = workspace_id else {
            return Ok(ChannelMemberAdd::NoSuchChannel);
        };

        let in_workspace = tx
            .query_row(
                "SELECT 1 FROM workspace_members WHERE workspace_id = ? AND user_id = ?",
                params![workspace_id, user_id.as_i64()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !in_workspace {
            return Ok(ChannelMemberAdd::NotWorkspaceMember);
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO channel_members (channel_id, user_id, joined_at)
                 VALUES (?, ?, ?)",
            params![
                channel_id.as_i64(),
                user_id.as_i64(),
                now.as_millis() as i64
            ],
        )?;

        tx.commit()?;

        Ok(if inserted > 0 {
            ChannelMemberAdd::Added
        } else {
            ChannelMemberAdd::AlreadyMember
        })
    }

    /// Remove a user from a channel; idempotent
    pub fn remove_channel_member(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM channel_members WHERE channel_id = ? AND user_id = ?",
            params![channel_id.as_i64(), user_id.as_i64()],
        )?;
        Ok(removed > 0)
    }

    /// Check channel membership
    pub fn is_channel_member(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
    ) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM channel_members WHERE channel_id = ? AND user_id = ?",
                params![channel_id.as_i64(), user_id.as_i64()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        Ok(found)
    }

    // ===== Message operations =====

    /// Append a message. The AUTOINCREMENT key assigns the id, so
    /// concurrent posts always receive distinct, increasing ids.
    pub fn insert_message(
        &self,
        channel_id: ChannelId,
        author_id: UserId,
        content: &str,
        now: Timestamp,
    ) -> Result<Message, StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO messages (channel_id, author_id, content, created_at)
                 VALUES (?, ?, ?, ?)",
            params![
                channel_id.as_i64(),
                author_id.as_i64(),
                content,
                now.as_millis() as i64
            ],
        )?;
        let id = MessageId::new(conn.last_insert_rowid());

        Ok(Message {
            id,
            channel_id,
            author: author_id,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Get a message by id
    pub fn get_message(&self, id: MessageId) -> Result<Option<Message>, StorageError> {
        let conn = self.conn()?;
        let message = conn
            .query_row(
                "SELECT channel_id, author_id, content, created_at FROM messages WHERE id = ?",
                params![id.as_i64()],
                |row| {
                    Ok(Message {
                        id,
                        channel_id: ChannelId::new(row.get::<_, i64>(0)?),
                        author: UserId::new(row.get::<_, i64>(1)?),
                        content: row.get(2)?,
                        created_at: Timestamp::from_millis(row.get::<_, i64>(3)?.max(0) as u64),
                    })
                },
            )
            .optional()?;
        Ok(message)
    }

    /// Replace a message's content; returns whether a row was updated
    pub fn update_message_content(
        &self,
        id: MessageId,
        content: &str,
    ) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE messages SET content = ? WHERE id = ?",
            params![content, id.as_i64()],
        )?;
        Ok(updated > 0)
    }

    /// Delete a single message; returns whether a row was deleted
    pub fn delete_message(&self, id: MessageId) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM messages WHERE id = ?", params![id.as_i64()])?;
        Ok(deleted > 0)
    }

    /// List a page of a channel's messages in (created_at, id) order
    pub fn list_messages(
        &self,
        channel_id: ChannelId,
        limit: u32,
        offset: u64,
    ) -> Result<Vec<Message>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, author_id, content, created_at FROM messages
                 WHERE channel_id = ?
                 ORDER BY created_at ASC, id ASC
                 LIMIT ? OFFSET ?",
        )?;
        let messages = stmt
            .query_map(
                params![channel_id.as_i64(), limit as i64, offset as i64],
                |row| {
                    Ok(Message {
                        id: MessageId::new(row.get::<_, i64>(0)?),
                        channel_id,
                        author: UserId::new(row.get::<_, i64>(1)?),
                        content: row.get(2)?,
                        created_at: Timestamp::from_millis(row.get::<_, i64>(3)?.max(0) as u64),
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ChatStore {
        ChatStore::memory().unwrap()
    }

    fn now() -> Timestamp {
        Timestamp::from_millis(1_000)
    }

    #[test]
    fn test_create_and_get_workspace() {
        let store = store();
        let alice = UserId::new(1);

        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let fetched = store.get_workspace(ws.id).unwrap().unwrap();

        assert_eq!(fetched.name, "Engineering");
        assert_eq!(fetched.owner_id, alice);
        assert!(fetched.is_member(alice));
    }

    #[test]
    fn test_get_missing_workspace() {
        let store = store();
        assert!(store.get_workspace(WorkspaceId::new(42)).unwrap().is_none());
    }

    #[test]
    fn test_add_workspace_member_idempotent() {
        let store = store();
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();

        let first = store
            .add_workspace_member(ws.id, bob, now(), false)
            .unwrap();
        let second = store
            .add_workspace_member(ws.id, bob, now(), false)
            .unwrap();

        assert_eq!(first, WorkspaceMemberAdd::Added);
        assert_eq!(second, WorkspaceMemberAdd::AlreadyMember);

        let fetched = store.get_workspace(ws.id).unwrap().unwrap();
        assert_eq!(fetched.member_count(), 2);
    }

    #[test]
    fn test_add_member_to_missing_workspace() {
        let store = store();
        let outcome = store
            .add_workspace_member(WorkspaceId::new(9), UserId::new(1), now(), false)
            .unwrap();
        assert_eq!(outcome, WorkspaceMemberAdd::NoSuchWorkspace);
    }

    #[test]
    fn test_remove_workspace_member_cascades_to_channels() {
        let store = store();
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let channel = store.create_channel(ws.id, "general", alice, now()).unwrap();

        store.add_workspace_member(ws.id, bob, now(), false).unwrap();
        store.add_channel_member(channel.id, bob, now()).unwrap();
        assert!(store.is_channel_member(channel.id, bob).unwrap());

        assert!(store.remove_workspace_member(ws.id, bob).unwrap());

        assert!(!store.is_workspace_member(ws.id, bob).unwrap());
        assert!(!store.is_channel_member(channel.id, bob).unwrap());
    }

    #[test]
    fn test_channel_member_requires_workspace_membership() {
        let store = store();
        let alice = UserId::new(1);
        let mallory = UserId::new(3);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let channel = store.create_channel(ws.id, "general", alice, now()).unwrap();

        let outcome = store.add_channel_member(channel.id, mallory, now()).unwrap();
        assert_eq!(outcome, ChannelMemberAdd::NotWorkspaceMember);
        assert!(!store.is_channel_member(channel.id, mallory).unwrap());
    }

    #[test]
    fn test_auto_join_enrolls_into_existing_channels() {
        let store = store();
        let alice = UserId::new(1);
        let bob = UserId::new(2);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let general = store.create_channel(ws.id, "general", alice, now()).unwrap();
        let random = store.create_channel(ws.id, "random", alice, now()).unwrap();

        store.add_workspace_member(ws.id, bob, now(), true).unwrap();

        assert!(store.is_channel_member(general.id, bob).unwrap());
        assert!(store.is_channel_member(random.id, bob).unwrap());
    }

    #[test]
    fn test_delete_channel_removes_children_first() {
        let store = store();
        let alice = UserId::new(1);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let channel = store.create_channel(ws.id, "general", alice, now()).unwrap();
        let message = store
            .insert_message(channel.id, alice, "hello", now())
            .unwrap();

        assert!(store.delete_channel(channel.id).unwrap());

        assert!(store.get_channel(channel.id).unwrap().is_none());
        assert!(store.get_message(message.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_workspace_cascades_everything() {
        let store = store();
        let alice = UserId::new(1);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let channel = store.create_channel(ws.id, "general", alice, now()).unwrap();
        let message = store
            .insert_message(channel.id, alice, "hello", now())
            .unwrap();

        assert!(store.delete_workspace(ws.id).unwrap());

        assert!(store.get_workspace(ws.id).unwrap().is_none());
        assert!(store.get_channel(channel.id).unwrap().is_none());
        assert!(store.get_message(message.id).unwrap().is_none());
        assert!(!store.is_workspace_member(ws.id, alice).unwrap());
    }

    #[test]
    fn test_message_ids_increase() {
        let store = store();
        let alice = UserId::new(1);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let channel = store.create_channel(ws.id, "general", alice, now()).unwrap();

        let m1 = store.insert_message(channel.id, alice, "one", now()).unwrap();
        let m2 = store.insert_message(channel.id, alice, "two", now()).unwrap();
        let m3 = store
            .insert_message(channel.id, alice, "three", now())
            .unwrap();

        assert!(m1.id.as_i64() < m2.id.as_i64());
        assert!(m2.id.as_i64() < m3.id.as_i64());
    }

    #[test]
    fn test_list_messages_pagination() {
        let store = store();
        let alice = UserId::new(1);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let channel = store.create_channel(ws.id, "general", alice, now()).unwrap();

        for i in 0..5 {
            store
                .insert_message(channel.id, alice, &format!("m{}", i), Timestamp::from_millis(1_000 + i))
                .unwrap();
        }

        let page1 = store.list_messages(channel.id, 2, 0).unwrap();
        let page2 = store.list_messages(channel.id, 2, 2).unwrap();
        let page3 = store.list_messages(channel.id, 2, 4).unwrap();

        assert_eq!(
            page1.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["m0", "m1"]
        );
        assert_eq!(
            page2.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["m2", "m3"]
        );
        assert_eq!(
            page3.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["m4"]
        );
    }

    #[test]
    fn test_edit_and_delete_message() {
        let store = store();
        let alice = UserId::new(1);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let channel = store.create_channel(ws.id, "general", alice, now()).unwrap();
        let message = store
            .insert_message(channel.id, alice, "draft", now())
            .unwrap();

        assert!(store.update_message_content(message.id, "final").unwrap());
        let fetched = store.get_message(message.id).unwrap().unwrap();
        assert_eq!(fetched.content, "final");
        assert_eq!(fetched.created_at, message.created_at);

        assert!(store.delete_message(message.id).unwrap());
        assert!(!store.delete_message(message.id).unwrap());
    }

    #[test]
    fn test_rename_channel() {
        let store = store();
        let alice = UserId::new(1);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        let channel = store.create_channel(ws.id, "general", alice, now()).unwrap();

        assert!(store.rename_channel(channel.id, "announcements").unwrap());
        let fetched = store.get_channel(channel.id).unwrap().unwrap();
        assert_eq!(fetched.name, "announcements");

        assert!(!store.rename_channel(ChannelId::new(99), "ghost").unwrap());
    }

    #[test]
    fn test_file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");
        let alice = UserId::new(1);

        let ws_id = {
            let store = ChatStore::open(&path).unwrap();
            store.create_workspace("Engineering", alice, now()).unwrap().id
        };

        let store = ChatStore::open(&path).unwrap();
        let ws = store.get_workspace(ws_id).unwrap().unwrap();
        assert_eq!(ws.name, "Engineering");
        assert!(ws.is_member(alice));
    }

    #[test]
    fn test_list_channels_in_creation_order() {
        let store = store();
        let alice = UserId::new(1);
        let ws = store.create_workspace("Engineering", alice, now()).unwrap();
        store
            .create_channel(ws.id, "general", alice, Timestamp::from_millis(1_000))
            .unwrap();
        store
            .create_channel(ws.id, "random", alice, Timestamp::from_millis(2_000))
            .unwrap();

        let channels = store.list_channels(ws.id).unwrap();
        assert_eq!(
            channels.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["general", "random"]
        );
    }
}
