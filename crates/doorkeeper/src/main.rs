mod config;
mod errors;
mod gateway;
mod handlers;
mod models;
mod registry;
mod repositories;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use config::Config;
use gateway::DiscordGateway;
use handlers::AppState;
use registry::PendingAuthorizations;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doorkeeper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Doorkeeper");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    // Open the database and make sure the schema exists
    let options = SqliteConnectOptions::new()
        .filename(&config.database_path)
        .create_if_missing(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to open database: {}", e);
            e
        })?;

    repositories::init_schema(&db_pool).await.map_err(|e| {
        error!("Failed to initialize schema: {}", e);
        e
    })?;

    info!(path = %config.database_path, "Database ready");

    // Register the slash commands with Discord
    let discord = DiscordGateway::new(&config.discord_token, &config.application_id);
    discord.register_commands().await.map_err(|e| {
        error!("Failed to register commands: {}", e);
        e
    })?;

    info!("Discord commands registered");

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    // Create application state
    let state = Arc::new(AppState {
        pool: db_pool,
        config,
        registry: PendingAuthorizations::new(),
        gateway: discord,
    });

    // Build application routes
    let app = routes::build_routes(state);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Doorkeeper listening on {}", addr);

    // Start server with ConnectInfo support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
