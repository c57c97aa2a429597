//! Account-link repository module for database operations.
//!
//! The schema enforces both uniqueness rules: one link per
//! `(server_id, user_id)` and one per `(server_id, minecraft_name)`. The
//! write paths below are single statements, so two concurrent
//! registrations for the same name cannot both succeed; callers may
//! pre-check existence only to produce a friendlier message.

use sqlx::SqlitePool;

use crate::errors::DkError;
use crate::models::AccountLink;

/// Maps a unique-violation to the constraint that was actually hit.
fn conflict_for(e: &sqlx::Error) -> DkError {
    let message = e
        .as_database_error()
        .map(|db| db.message().to_string())
        .unwrap_or_default();
    if message.contains("minecraft_name") {
        DkError::Conflict("This nickname is already taken".to_string())
    } else {
        DkError::Conflict("This user is already registered on this server".to_string())
    }
}

/// Insert a new link as a single constraint-enforcing statement.
pub async fn create(pool: &SqlitePool, link: &AccountLink) -> Result<(), DkError> {
    sqlx::query(
        r#"
        INSERT INTO links (name, user_id, server_id, minecraft_name)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&link.name)
    .bind(&link.user_id)
    .bind(&link.server_id)
    .bind(&link.minecraft_name)
    .execute(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e) {
            conflict_for(&e)
        } else {
            DkError::Database(format!("Failed to create link: {e}"))
        }
    })?;

    Ok(())
}

/// Get the link for a Discord user on a server.
pub async fn get(
    pool: &SqlitePool,
    server_id: &str,
    user_id: &str,
) -> Result<Option<AccountLink>, DkError> {
    let link = sqlx::query_as::<_, AccountLink>(
        r#"
        SELECT name, user_id, server_id, minecraft_name
        FROM links
        WHERE server_id = ? AND user_id = ?
        "#,
    )
    .bind(server_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| DkError::Database(format!("Failed to fetch link by user: {e}")))?;

    Ok(link)
}

/// Get the link holding a Minecraft name on a server.
pub async fn get_by_minecraft_name(
    pool: &SqlitePool,
    server_id: &str,
    minecraft_name: &str,
) -> Result<Option<AccountLink>, DkError> {
    let link = sqlx::query_as::<_, AccountLink>(
        r#"
        SELECT name, user_id, server_id, minecraft_name
        FROM links
        WHERE server_id = ? AND minecraft_name = ?
        "#,
    )
    .bind(server_id)
    .bind(minecraft_name)
    .fetch_optional(pool)
    .await
    .map_err(|e| DkError::Database(format!("Failed to fetch link by minecraft name: {e}")))?;

    Ok(link)
}

/// Change the Minecraft name (and display name) of an existing link.
///
/// Returns `NotFound` when the user has no link on this server and
/// `Conflict` when the new name is held by another link.
pub async fn update_minecraft_name(
    pool: &SqlitePool,
    server_id: &str,
    user_id: &str,
    name: &str,
    minecraft_name: &str,
) -> Result<(), DkError> {
    let result = sqlx::query(
        r#"
        UPDATE links
        SET name = ?, minecraft_name = ?
        WHERE server_id = ? AND user_id = ?
        "#,
    )
    .bind(name)
    .bind(minecraft_name)
    .bind(server_id)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| {
        if super::is_unique_violation(&e) {
            conflict_for(&e)
        } else {
            DkError::Database(format!("Failed to update link: {e}"))
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(DkError::NotFound);
    }

    Ok(())
}

/// True when the user already has a link on the server.
pub async fn exists_with_user(
    pool: &SqlitePool,
    server_id: &str,
    user_id: &str,
) -> Result<bool, DkError> {
    let exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM links
            WHERE server_id = ? AND user_id = ?
        )
        "#,
    )
    .bind(server_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(|e| DkError::Database(format!("Failed to check user existence: {e}")))?;

    Ok(exists.0)
}

/// True when the Minecraft name is already held on the server.
pub async fn exists_with_minecraft_name(
    pool: &SqlitePool,
    server_id: &str,
    minecraft_name: &str,
) -> Result<bool, DkError> {
    let exists: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM links
            WHERE server_id = ? AND minecraft_name = ?
        )
        "#,
    )
    .bind(server_id)
    .bind(minecraft_name)
    .fetch_one(pool)
    .await
    .map_err(|e| DkError::Database(format!("Failed to check minecraft name existence: {e}")))?;

    Ok(exists.0)
}
