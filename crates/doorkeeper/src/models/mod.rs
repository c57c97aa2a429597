//! Data models shared across the service.

use serde::{Deserialize, Serialize};

/// A registered game server (maps to the `servers` table).
///
/// Immutable once provisioned; `token` is the shared secret handed to the
/// server-side plugin and must never appear outside the /setup reply.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ServerRecord {
    pub id: String,
    pub token: String,
    pub address: String,
    pub guild_id: String,
}

/// One player's link between a Discord user and a Minecraft account name,
/// scoped to a single server (maps to the `links` table).
///
/// The JSON field spellings are part of the plugin wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccountLink {
    pub name: String,
    #[serde(rename = "user-id")]
    pub user_id: String,
    #[serde(rename = "server-id")]
    pub server_id: String,
    #[serde(rename = "minecraft-name")]
    pub minecraft_name: String,
}
