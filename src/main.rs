use std::sync::Arc;

use chrono::Duration;
use tracing_subscriber::EnvFilter;

use catalog_admin::api::{build_router, AppState};
use catalog_admin::auth::{AuthenticationService, FixedCredentialVerifier};
use catalog_admin::config::AppConfig;
use catalog_admin::infrastructure::database::{self, RetryPolicy};
use catalog_admin::infrastructure::repositories::{
    PostgresProductRepository, PostgresUserRepository,
};
use catalog_admin::infrastructure::storage::LocalFileStorage;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog_admin=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = database::connect(&config.database).await?;
    database::migrate(&pool).await?;
    tracing::info!("Database connected successfully");

    let retry = RetryPolicy::new(config.database.max_retries);
    let verifier = FixedCredentialVerifier::from_config(&config.admin)?;
    let auth = AuthenticationService::new(
        Arc::new(verifier),
        &config.session.secret,
        Duration::hours(config.session.lifetime_hours),
        config.session.secure_cookies,
    );

    let state = AppState::new(
        Arc::new(PostgresUserRepository::new(pool.clone(), retry)),
        Arc::new(PostgresProductRepository::new(pool, retry)),
        Arc::new(LocalFileStorage::new(config.web_root.clone())),
        auth,
    );
    let app = build_router(state, &config.web_root);

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
