use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::gateway::MessagingGateway;
use crate::handlers::{authorize_handler, interaction_handler, lookup_handler, AppState};

pub fn build_routes<G: MessagingGateway>(state: Arc<AppState<G>>) -> Router {
    Router::new()
        // Game-server front door (spellings are plugin wire contract)
        .route(
            "/:server_id/by-minecraft-name/:minecraft_name",
            get(lookup_handler::by_minecraft_name::<G>),
        )
        .route(
            "/:server_id/by-minecraft-name/:minecraft_name/authorize",
            post(authorize_handler::authorize::<G>),
        )
        // Discord interaction endpoint
        .route("/interactions", post(interaction_handler::interactions::<G>))
        // Health check
        .route("/health", get(health_check))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
