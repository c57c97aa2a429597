//! HTTP request handlers.

pub mod authorize_handler;
pub mod interaction_handler;
pub mod lookup_handler;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::errors::DkError;
use crate::models::{AccountLink, ServerRecord};
use crate::registry::PendingAuthorizations;
use crate::repositories::{links, servers};

/// Application state shared across handlers, generic over the messaging
/// gateway so tests can substitute a scripted one.
pub struct AppState<G> {
    pub pool: SqlitePool,
    pub config: Config,
    pub registry: PendingAuthorizations,
    pub gateway: G,
}

/// Resolve the `{server_id}/{minecraft_name}` pair shared by the two
/// front-door routes: an unknown server is the caller's error (400), a
/// missing link is 404.
pub(crate) async fn resolve(
    pool: &SqlitePool,
    server_id: &str,
    minecraft_name: &str,
) -> Result<(ServerRecord, AccountLink), DkError> {
    let server = servers::get(pool, server_id)
        .await?
        .ok_or(DkError::UnknownServer)?;
    let link = links::get_by_minecraft_name(pool, server_id, minecraft_name)
        .await?
        .ok_or(DkError::NotFound)?;
    Ok((server, link))
}
