use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::DkError;
use crate::gateway::MessagingGateway;
use crate::handlers::{resolve, AppState};
use crate::models::AccountLink;

/// Look up the account link holding a Minecraft name on a server.
///
/// GET /:server_id/by-minecraft-name/:minecraft_name
pub async fn by_minecraft_name<G: MessagingGateway>(
    State(state): State<Arc<AppState<G>>>,
    Path((server_id, minecraft_name)): Path<(String, String)>,
) -> Result<Json<AccountLink>, DkError> {
    let (_, link) = resolve(&state.pool, &server_id, &minecraft_name).await?;
    Ok(Json(link))
}
