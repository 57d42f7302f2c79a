use review_board::api::{self, AppState};
use review_board::config::AppConfig;
use review_board::storage::JsonStore;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
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

    info!("🚀 Starting Review Board Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Data File: {:?}", config.storage.data_path);
    info!("   - Static Dir: {:?}", config.storage.static_dir);
    info!("   - Server: {}:{}", config.server.host, config.server.port);

    // Initialize the file-backed store
    info!("💾 Initializing review store...");
    let store = Arc::new(JsonStore::new(&config.storage.data_path));
    store.initialize()?;
    let review_count = store.load()?.reviews.len();
    info!("✅ Review store ready ({} reviews)", review_count);

    // Create application state
    let state = AppState {
        store,
        static_dir: config.storage.static_dir.clone(),
    };

    // Build router with modular routes
    let app = api::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /               - Review submission page");
    info!("   GET  /api/reviews    - List reviews");
    info!("   POST /api/reviews    - Submit a review");
    info!("   GET  /api/settings   - Current settings");
    info!("   PUT  /api/settings   - Update settings");
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
