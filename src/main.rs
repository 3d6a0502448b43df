mod api;
mod config;
mod generator;
mod storage;

use crate::api::AppState;
use crate::config::AppConfig;
use crate::generator::ReviewGenerator;
use crate::storage::ReviewStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("🚀 Starting Code Review API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Model: {}", config.generator.model);
    info!("   - Database: {:?}", config.storage.db_path);
    info!("   - Server: {}:{}", config.server.host, config.server.port);

    // Open review storage (creates the reviews table if absent)
    info!("💾 Initializing review storage...");
    let store = Arc::new(ReviewStore::open(&config.storage.db_path)?);
    let review_count = store.count().await.unwrap_or(0);
    info!("✅ Review storage ready ({} reviews)", review_count);

    // Configure the review generator. A missing API key is not fatal: the
    // server runs degraded and every review request returns the fallback text.
    let generator = ReviewGenerator::new(config.generator.api_key.clone(), &config.generator.model);
    if generator.is_configured() {
        info!("🧠 Review generator ready (model: {})", config.generator.model);
    } else {
        warn!("⚠️  GEMINI_API_KEY is not set; every review request will return the fallback text");
    }

    // Create application state
    let state = AppState {
        store,
        generator: Arc::new(generator),
    };

    // Build router with modular routes
    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET    /health        - Health check");
    info!("   POST   /review        - Submit a file for review");
    info!("   GET    /history       - List past reviews");
    info!("   DELETE /history/{{id}}  - Delete a past review");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
