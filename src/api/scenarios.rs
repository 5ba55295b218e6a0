use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::state::AppState;
use crate::db::models::NewScenario;
use crate::db::ScenarioRepository;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct AddScenarioResponse {
    pub success: bool,
}

/// POST /api/scenarios/{username}
pub async fn add_scenario(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(scenario): Json<NewScenario>,
) -> Result<Json<AddScenarioResponse>, AppError> {
    ScenarioRepository::add_custom_scenario(&*state.store, &username, &scenario).await?;
    Ok(Json(AddScenarioResponse { success: true }))
}
