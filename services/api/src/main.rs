use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{AppState, ServerConfig, create_router};
use auth::{AuthState, jwt::JwtConfig, session::CookieConfig};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use media::{ImageKitHost, MediaHostConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting FeedHub API service");

    let server_config = ServerConfig::from_env()?;
    let jwt_config = JwtConfig::from_env()?;
    let cookie_config = CookieConfig::from_env();
    let media_host = ImageKitHost::new(MediaHostConfig::from_env()?)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;

    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let auth_state = AuthState::new(pool.clone(), jwt_config, cookie_config);
    let app_state = AppState::new(pool, auth_state, Arc::new(media_host));

    let app = create_router(app_state, &server_config);

    let listener = tokio::net::TcpListener::bind(server_config.addr).await?;
    info!("API service listening on {}", server_config.addr);

    axum::serve(listener, app).await?;

    Ok(())
}
