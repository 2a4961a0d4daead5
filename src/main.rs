mod api;
mod app;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod pricing;
mod routes;
mod services;

use anyhow::Result;

use services::{Notifier, RatesCache, RealtimeHub};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting homequote backend"
    );

    // Create database pool and apply migrations
    let pool = db::create_pool(&settings).await?;
    sqlx::migrate!().run(&pool).await?;

    // Rate catalog cache
    let rates = RatesCache::new(settings.rates_cache_ttl_seconds);

    // Per-inquiry message fan-out
    let realtime = RealtimeHub::new();

    // Fire-and-forget notification dispatcher
    let notifier = Notifier::new(pool.clone(), &settings)?;

    // Create application state
    let state = app::AppState::new(pool, settings.clone(), rates, realtime, notifier);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
