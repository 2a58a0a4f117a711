// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use server_core::kernel::{start_cleanup_scheduler, EmailClient, WebPushClient};
use server_core::server::build_app;
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Peerprep API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Outbound transports
    let email = Arc::new(EmailClient::new(
        config.email_api_key.clone(),
        config.email_from.clone(),
    ));
    let web_push = Arc::new(WebPushClient::new(config.web_push_api_key.clone()));

    // Build application
    let (app, app_state) = build_app(pool.clone(), email, web_push);

    // Start the expiry cleanup scheduler
    let _cleanup = start_cleanup_scheduler(
        pool,
        app_state.dispatcher.clone(),
        config.cleanup_interval,
        config.cleanup_initial_delay,
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
