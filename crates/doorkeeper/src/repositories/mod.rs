//! Database access layer.
//!
//! Module-level functions over a `SqlitePool`; uniqueness is enforced by
//! the schema constraints, never by check-then-insert sequences.

pub mod links;
pub mod servers;

use sqlx::SqlitePool;

use crate::errors::DkError;

const CREATE_SERVERS: &str = r#"
CREATE TABLE IF NOT EXISTS servers (
    id       TEXT NOT NULL PRIMARY KEY,
    token    TEXT NOT NULL,
    address  TEXT NOT NULL,
    guild_id TEXT NOT NULL,
    UNIQUE(address, guild_id)
)
"#;

const CREATE_LINKS: &str = r#"
CREATE TABLE IF NOT EXISTS links (
    name           TEXT NOT NULL,
    user_id        TEXT NOT NULL,
    server_id      TEXT NOT NULL,
    minecraft_name TEXT NOT NULL,
    PRIMARY KEY(server_id, user_id),
    UNIQUE(server_id, minecraft_name)
)
"#;

/// Create the two tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), DkError> {
    for statement in [CREATE_SERVERS, CREATE_LINKS] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DkError::Database(format!("Failed to create schema: {e}")))?;
    }
    Ok(())
}

/// True when the driver reports a violated UNIQUE or PRIMARY KEY constraint.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}
