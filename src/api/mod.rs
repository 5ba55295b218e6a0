pub mod conversation;
pub mod profile;
pub mod scenarios;
pub mod state;

pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(health))
        // Profile endpoints
        .route("/api/profile/{username}", get(profile::get_profile))
        .route("/api/users", post(profile::create_or_update_user))
        // Conversation and scenario endpoints
        .route(
            "/api/conversation/{username}",
            post(conversation::save_conversation),
        )
        .route("/api/scenarios/{username}", post(scenarios::add_scenario))
        // Add request timeout
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
