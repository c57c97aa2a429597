//! Server repository module for database operations.

use sqlx::SqlitePool;

use crate::errors::DkError;
use crate::models::ServerRecord;

/// Insert a freshly provisioned server.
///
/// The `(address, guild_id)` pair is unique; a second setup for the same
/// address in the same guild is rejected with `Conflict`.
pub async fn create(pool: &SqlitePool, server: &ServerRecord) -> Result<(), DkError> {
    sqlx::query(
        r#"
        INSERT INTO servers (id, token, address, guild_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&server.id)
    .bind(&server.token)
    .bind(&server.address)
    .bind(&server.guild_id)
    .execute(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e) {
            DkError::Conflict("A server is already set up for this address in this guild".to_string())
        } else {
            DkError::Database(format!("Failed to create server: {e}"))
        }
    })?;

    Ok(())
}

/// Get a server by id.
pub async fn get(pool: &SqlitePool, server_id: &str) -> Result<Option<ServerRecord>, DkError> {
    let server = sqlx::query_as::<_, ServerRecord>(
        r#"
        SELECT id, token, address, guild_id
        FROM servers
        WHERE id = ?
        "#,
    )
    .bind(server_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| DkError::Database(format!("Failed to fetch server by id: {e}")))?;

    Ok(server)
}

/// Get a server by its address within a guild.
pub async fn get_by_address(
    pool: &SqlitePool,
    guild_id: &str,
    address: &str,
) -> Result<Option<ServerRecord>, DkError> {
    let server = sqlx::query_as::<_, ServerRecord>(
        r#"
        SELECT id, token, address, guild_id
        FROM servers
        WHERE guild_id = ? AND address = ?
        "#,
    )
    .bind(guild_id)
    .bind(address)
    .fetch_optional(pool)
    .await
    .map_err(|e| DkError::Database(format!("Failed to fetch server by address: {e}")))?;

    Ok(server)
}
