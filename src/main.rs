use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use messagely::{
    api::{create_router, AppState},
    config::Config,
    crypto::TokenIssuer,
    db,
    error::AppError,
    service::{IdentityService, MessagingService},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,messagely=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting messagely server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    let pool = db::connect(
        &config.database_url,
        config.db_max_connections,
        config.db_min_connections,
    )
    .await?;
    tracing::info!("✅ Database connected: {}", config.database_url);

    db::migrate(&pool).await?;
    tracing::info!("✅ Database schema ready");

    let tokens = Arc::new(TokenIssuer::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::hours(config.token_expiry_hours),
    ));
    tracing::info!("✅ Token issuer configured ({}h expiry)", config.token_expiry_hours);

    let state = AppState {
        identity: IdentityService::new(pool.clone()),
        messages: MessagingService::new(pool),
        tokens,
        config: config.clone(),
    };

    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/api/health", addr);
    tracing::info!("");
    tracing::info!("📚 API Endpoints:");
    tracing::info!("  POST /auth/register          - Register and receive a token");
    tracing::info!("  POST /auth/login             - Login and receive a token");
    tracing::info!("  GET  /users                  - List users (requires auth)");
    tracing::info!("  GET  /users/:username        - User detail (requires auth)");
    tracing::info!("  GET  /users/:username/from   - Sent messages (requires auth)");
    tracing::info!("  GET  /users/:username/to     - Received messages (requires auth)");
    tracing::info!("  POST /messages               - Send message (requires auth)");
    tracing::info!("  GET  /messages/:id           - Message detail (requires auth)");
    tracing::info!("  POST /messages/:id/read      - Mark read (requires auth)");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
