//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::info!(from = current, to = CURRENT_VERSION, "schema migrated");
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Protected-resource tree
        CREATE TABLE functions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            parent_id TEXT REFERENCES functions(id)   -- NULL for roots
        );

        -- Verbs
        CREATE TABLE commands (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        -- Which verbs are legal for which function
        CREATE TABLE command_in_functions (
            command_id TEXT NOT NULL REFERENCES commands(id) ON DELETE CASCADE,
            function_id TEXT NOT NULL REFERENCES functions(id) ON DELETE CASCADE,
            PRIMARY KEY (command_id, function_id)
        );

        -- Roles known to the grant store
        CREATE TABLE roles (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        -- Grants: only attached (command, function) pairs can be granted
        CREATE TABLE permissions (
            role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
            function_id TEXT NOT NULL,
            command_id TEXT NOT NULL,
            PRIMARY KEY (role_id, function_id, command_id),
            FOREIGN KEY (command_id, function_id)
                REFERENCES command_in_functions(command_id, function_id) ON DELETE CASCADE
        );

        -- Named monotonic counters
        CREATE TABLE sequences (
            name TEXT PRIMARY KEY,
            current_value INTEGER NOT NULL
        );

        CREATE INDEX idx_functions_parent ON functions(parent_id);
        CREATE INDEX idx_cif_function ON command_in_functions(function_id);
        CREATE INDEX idx_permissions_pair ON permissions(command_id, function_id);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
