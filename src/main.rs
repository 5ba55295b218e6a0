use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingua_store::{
    api::{create_router, AppState},
    config::Config,
    error::AppError,
    store::{DocumentStore, MongoStore},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lingua_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting lingua-store v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    // Connect the document store and make sure the indexes exist
    let store = MongoStore::new(&config.mongodb_uri, &config.mongodb_db);
    store.connect().await?;
    store.ensure_indexes().await?;
    tracing::info!("✅ Document store ready: {}", config.mongodb_db);

    // Create shared application state
    let store: Arc<dyn DocumentStore> = Arc::new(store);
    let state = AppState {
        store: store.clone(),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/api/health", addr);
    tracing::info!("");
    tracing::info!("📚 API Endpoints:");
    tracing::info!("  GET  /api/profile/{{username}}      - Get composed user profile");
    tracing::info!("  POST /api/users                   - Create or update a user");
    tracing::info!("  POST /api/conversation/{{username}} - Save a conversation");
    tracing::info!("  POST /api/scenarios/{{username}}    - Add a custom scenario");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    store.close().await?;

    Ok(())
}
