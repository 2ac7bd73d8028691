//! Server entry point: config, MongoDB connection, router, serve

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use aquarota::config::AppConfig;
use aquarota::core::auth::TokenManager;
use aquarota::server::{AppState, api_router};
use aquarota::storage::{MongoOrderStore, MongoRouteStore, MongoUserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;

    let client = mongodb::Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("failed to connect to MongoDB")?;
    let db = client.database(&config.database);
    tracing::info!(database = %config.database, "connected to MongoDB");

    let users = MongoUserStore::new(db.clone());
    users
        .ensure_indexes()
        .await
        .context("failed to create indexes")?;

    let state = AppState::new(
        Arc::new(MongoOrderStore::new(db.clone())),
        Arc::new(MongoRouteStore::new(db)),
        Arc::new(users),
        TokenManager::new(&config.jwt_secret, config.token_ttl_hours),
    );

    let app = api_router(state);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
