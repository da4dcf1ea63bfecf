use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logist_reports::{
    api::{create_router, AppState},
    config::Config,
    db::Database,
    error::AppError,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,logist_reports=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting logist-reports server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development secret");
    }
    if config.logist_invite_code.is_none() {
        tracing::warn!("LOGIST_INVITE_CODE is not set; logist registration is disabled");
    }
    tracing::info!("✅ Configuration loaded");

    let db = Database::connect(&config).await?;
    tracing::info!("✅ Database connected: {}", config.database_url);

    db.migrate().await?;
    tracing::info!("✅ Database migrations completed");

    let state = AppState::new(db.clone(), config.clone());
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/api/health", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)));

    db.close().await;
    tracing::info!("Database closed");

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
