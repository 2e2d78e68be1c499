//! Database migrations for the chat store
//!
//! Versioned migrations for the workspace/channel/message schema. Each
//! migration is applied atomically and tracked in the schema_version
//! table.
//!
//! Deletion of a workspace or channel is an explicit, ordered routine
//! in the store (children first), so the schema declares plain foreign
//! keys without engine-level cascade clauses.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Current schema version for the chat store
pub const CURRENT_CHAT_SCHEMA_VERSION: i32 = 1;

/// Migration descriptor
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
    pub down_sql: Option<&'static str>,
}

/// All available migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial workspaces, channels, and messages schema",
        up_sql: r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS chat_schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            );

            -- Workspaces (top-level tenant groupings)
            CREATE TABLE IF NOT EXISTS workspaces (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                owner_id INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_workspaces_owner ON workspaces(owner_id);

            -- Workspace members (join table; the owner always has a row)
            CREATE TABLE IF NOT EXISTS workspace_members (
                workspace_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                joined_at INTEGER NOT NULL,
                PRIMARY KEY (workspace_id, user_id),
                FOREIGN KEY (workspace_id) REFERENCES workspaces(id)
            );

            CREATE INDEX IF NOT EXISTS idx_workspace_members_user ON workspace_members(user_id);

            -- Channels (sub-spaces of a workspace)
            CREATE TABLE IF NOT EXISTS channels (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workspace_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (workspace_id) REFERENCES workspaces(id)
            );

            CREATE INDEX IF NOT EXISTS idx_channels_workspace ON channels(workspace_id);

            -- Channel members (join table; subset of workspace members)
            CREATE TABLE IF NOT EXISTS channel_members (
                channel_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                joined_at INTEGER NOT NULL,
                PRIMARY KEY (channel_id, user_id),
                FOREIGN KEY (channel_id) REFERENCES channels(id)
            );

            CREATE INDEX IF NOT EXISTS idx_channel_members_user ON channel_members(user_id);

            -- Messages (append-only per channel; AUTOINCREMENT keeps ids
            -- strictly increasing and never reused)
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                channel_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (channel_id) REFERENCES channels(id)
            );

            CREATE INDEX IF NOT EXISTS idx_messages_channel ON messages(channel_id, created_at, id);
        "#,
        down_sql: Some(
            r#"
            DROP INDEX IF EXISTS idx_messages_channel;
            DROP TABLE IF EXISTS messages;

            DROP INDEX IF EXISTS idx_channel_members_user;
            DROP TABLE IF EXISTS channel_members;

            DROP INDEX IF EXISTS idx_channels_workspace;
            DROP TABLE IF EXISTS channels;

            DROP INDEX IF EXISTS idx_workspace_members_user;
            DROP TABLE IF EXISTS workspace_members;

            DROP INDEX IF EXISTS idx_workspaces_owner;
            DROP TABLE IF EXISTS workspaces;

            DROP TABLE IF EXISTS chat_schema_version;
        "#,
        ),
    }]
}

/// Get current schema version from database
fn get_current_version(pool: &Pool<SqliteConnectionManager>) -> Result<i32, rusqlite::Error> {
    let conn = pool.get().map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to get connection: {}", e),
        )))
    })?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS chat_schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Result<i32, _> = conn.query_row(
        "SELECT version FROM chat_schema_version ORDER BY version DESC LIMIT 1",
        [],
        |row| row.get(0),
    );

    Ok(version.unwrap_or(0))
}

/// Run all pending migrations
pub fn migrate(pool: &Pool<SqliteConnectionManager>) -> Result<(), rusqlite::Error> {
    let current_version = get_current_version(pool)?;
    let migrations = get_migrations();

    let pending: Vec<_> = migrations
        .into_iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending.is_empty() {
        return Ok(());
    }

    let conn = pool.get().map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to get connection: {}", e),
        )))
    })?;

    for migration in pending {
        let tx = conn.unchecked_transaction()?;

        tx.execute_batch(migration.up_sql)?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as i64;

        tx.execute(
            "INSERT INTO chat_schema_version (version, applied_at) VALUES (?, ?)",
            params![migration.version, now],
        )?;

        tx.commit()?;

        info!(
            version = migration.version,
            "applied migration: {}", migration.description
        );
    }

    Ok(())
}

/// Get the latest migration version available
pub fn get_latest_version() -> i32 {
    get_migrations().iter().map(|m| m.version).max().unwrap_or(0)
}
