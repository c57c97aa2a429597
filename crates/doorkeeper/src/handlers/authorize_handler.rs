use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::warn;

use crate::errors::DkError;
use crate::gateway::MessagingGateway;
use crate::handlers::{resolve, AppState};
use crate::services::authorization::{self, Decision};

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    /// Source address of the login attempt, shown to the approving user.
    #[serde(default)]
    pub from: String,
}

/// Ask the linked Discord user to approve a login attempt.
///
/// POST /:server_id/by-minecraft-name/:minecraft_name/authorize?from=ADDR
///
/// 200 when the user pressed Allow; 401 when they pressed Deny or never
/// answered within the deadline.
pub async fn authorize<G: MessagingGateway>(
    State(state): State<Arc<AppState<G>>>,
    Path((server_id, minecraft_name)): Path<(String, String)>,
    Query(params): Query<AuthorizeParams>,
) -> Result<StatusCode, DkError> {
    let (server, link) = resolve(&state.pool, &server_id, &minecraft_name).await?;

    let decision = authorization::authorize(
        &state.gateway,
        &state.registry,
        &server,
        &link,
        &params.from,
        state.config.authorization_timeout,
    )
    .await?;

    match decision {
        Decision::Allowed => Ok(StatusCode::OK),
        Decision::Denied => Ok(StatusCode::UNAUTHORIZED),
        Decision::TimedOut => {
            // Same answer for the game server as a denial, but kept apart
            // in the logs.
            warn!(%server_id, %minecraft_name, "login attempt expired unanswered");
            Ok(StatusCode::UNAUTHORIZED)
        }
    }
}
