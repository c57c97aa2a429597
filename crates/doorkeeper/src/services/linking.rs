//! Account linking and server provisioning workflows.
//!
//! Validate-then-write flows behind the Discord surface. The pre-checks
//! only select a friendlier reply; the single-statement writes in the
//! repositories are what actually enforce uniqueness, so two concurrent
//! registrations for the same name cannot both succeed.

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::errors::DkError;
use crate::models::{AccountLink, ServerRecord};
use crate::repositories::{links, servers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
    NicknameTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotRegistered,
    NicknameTaken,
}

/// Provision a new server for a guild: fresh id, fresh secret.
pub async fn provision_server(
    pool: &SqlitePool,
    guild_id: &str,
    address: &str,
) -> Result<ServerRecord, DkError> {
    let server = ServerRecord {
        id: Uuid::new_v4().to_string(),
        token: Uuid::new_v4().to_string(),
        address: address.to_string(),
        guild_id: guild_id.to_string(),
    };

    servers::create(pool, &server).await?;
    info!(server_id = %server.id, address = %server.address, guild = %server.guild_id, "provisioned server");

    Ok(server)
}

/// Link a Discord user to a Minecraft name on a server.
pub async fn register(
    pool: &SqlitePool,
    server_id: &str,
    user_id: &str,
    display_name: &str,
    minecraft_name: &str,
) -> Result<RegistrationOutcome, DkError> {
    if links::exists_with_user(pool, server_id, user_id).await? {
        return Ok(RegistrationOutcome::AlreadyRegistered);
    }
    if links::exists_with_minecraft_name(pool, server_id, minecraft_name).await? {
        return Ok(RegistrationOutcome::NicknameTaken);
    }

    let link = AccountLink {
        name: display_name.to_string(),
        user_id: user_id.to_string(),
        server_id: server_id.to_string(),
        minecraft_name: minecraft_name.to_string(),
    };

    match links::create(pool, &link).await {
        Ok(()) => {
            info!(%server_id, %minecraft_name, name = %display_name, "added link");
            Ok(RegistrationOutcome::Registered)
        }
        // Lost a race with a concurrent registration; the constraint tells
        // us which rule was hit.
        Err(DkError::Conflict(reason)) if reason.contains("nickname") => {
            Ok(RegistrationOutcome::NicknameTaken)
        }
        Err(DkError::Conflict(_)) => Ok(RegistrationOutcome::AlreadyRegistered),
        Err(e) => Err(e),
    }
}

/// Change the Minecraft name of an existing link.
pub async fn update(
    pool: &SqlitePool,
    server_id: &str,
    user_id: &str,
    display_name: &str,
    minecraft_name: &str,
) -> Result<UpdateOutcome, DkError> {
    if links::get(pool, server_id, user_id).await?.is_none() {
        return Ok(UpdateOutcome::NotRegistered);
    }
    if links::exists_with_minecraft_name(pool, server_id, minecraft_name).await? {
        return Ok(UpdateOutcome::NicknameTaken);
    }

    match links::update_minecraft_name(pool, server_id, user_id, display_name, minecraft_name).await
    {
        Ok(()) => {
            info!(%server_id, %minecraft_name, name = %display_name, "updated link");
            Ok(UpdateOutcome::Updated)
        }
        Err(DkError::Conflict(_)) => Ok(UpdateOutcome::NicknameTaken),
        Err(DkError::NotFound) => Ok(UpdateOutcome::NotRegistered),
        Err(e) => Err(e),
    }
}
