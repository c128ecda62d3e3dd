//! Rolegate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod extract;
mod handlers;
mod middleware;
mod state;

#[cfg(test)]
mod test_support;

use axum::Router;
use rolegate_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, StorageBackend, init_tracing};
use crate::api_router::build_router;
use crate::api_services::{
    RepositorySet, build_app_state, build_memory_session_layer, build_postgres_session_layer,
    connect_and_migrate,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        connect_and_migrate(config.required_database_url()?).await?;
        info!("database migrations applied");
        return Ok(());
    }

    let app = match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_and_migrate(config.required_database_url()?).await?;
            let app_state = build_app_state(RepositorySet::postgres(&pool), &config).await?;
            let session_layer = build_postgres_session_layer(pool, config.cookie_secure).await?;
            build_router(app_state, session_layer)?
        }
        StorageBackend::Memory => {
            info!("using in-memory storage; data is lost on shutdown");
            let app_state = build_app_state(RepositorySet::in_memory(), &config).await?;
            let session_layer = build_memory_session_layer(config.cookie_secure);
            build_router(app_state, session_layer)?
        }
    };

    serve(app, &config).await
}

async fn serve(app: Router, config: &ApiConfig) -> Result<(), AppError> {
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind API listener: {error}")))?;

    info!(%address, "rolegate api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server failed: {error}")))
}
