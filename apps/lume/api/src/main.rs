use axum_helpers::{JwtAuth, create_production_app};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::common::RetryConfig;
use domain_chat::{ChatService, PgChatRepository};
use domain_users::{
    FlowConfig, GoogleProvider, OAuthFlowService, PgOAuthStateRepository,
    PgPermissionRequestRepository, PgUserRepository, UserService,
};
use migration::Migrator;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod config;
mod openapi;
mod permissions;
mod routes;

use config::Config;
use permissions::UserPermissions;
use routes::Domains;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let db = database::postgres::connect_from_config_with_retry(
        config.database.clone(),
        Some(RetryConfig::new().with_max_retries(5)),
    )
    .await
    .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

    database::postgres::run_migrations::<Migrator>(&db, config.app.name)
        .await
        .map_err(|e| eyre::eyre!("Migrations failed: {}", e))?;

    let provider = GoogleProvider::new(
        config.google.client_id.clone(),
        config.google.client_secret.clone(),
    )
    .map_err(|e| eyre::eyre!("Failed to build Google client: {}", e))?;

    let flow = OAuthFlowService::new(
        Arc::new(PgUserRepository::new(db.clone())),
        Arc::new(PgOAuthStateRepository::new(db.clone())),
        Arc::new(PgPermissionRequestRepository::new(db.clone())),
        Arc::new(provider),
        FlowConfig::new(config.google.redirect_base_url.clone())
            .with_state_ttl(config.google.state_ttl_secs)
            .with_admin_emails(&config.admin_emails),
    );

    let users = UserService::new(PgUserRepository::new(db.clone()));
    let chat = ChatService::new(
        PgChatRepository::new(db.clone()),
        Arc::new(UserPermissions::new(users.clone())),
    );

    let domains = Domains {
        flow: Arc::new(flow),
        users,
        chat,
        jwt: JwtAuth::new(&config.jwt),
        frontend_url: config.frontend_url.clone(),
    };

    let app_routes = routes::routes(domains, config.app.clone())
        .with_root(routes::ready_router(db.clone()))
        .with_static_dir(config.frontend_dist_dir.clone());

    let router = axum_helpers::create_router::<openapi::ApiDoc>(app_routes, &config.cors_origins)?;

    info!(
        redirect_base = %config.google.redirect_base_url,
        frontend = %config.frontend_url,
        "Starting Lume API"
    );

    create_production_app(router, &config.server, Duration::from_secs(30), async move {
        info!("Shutting down: closing database connections");
        match db.close().await {
            Ok(_) => info!("PostgreSQL connection closed successfully"),
            Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Lume API shutdown complete");
    Ok(())
}
