use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::db::models::Exchange;
use crate::db::MessageRepository;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SaveConversationRequest {
    #[serde(default)]
    pub messages: Vec<Exchange>,
}

#[derive(Debug, Serialize)]
pub struct SaveConversationResponse {
    pub success: bool,
}

/// POST /api/conversation/{username}
pub async fn save_conversation(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<SaveConversationRequest>,
) -> Result<Json<SaveConversationResponse>, AppError> {
    MessageRepository::save_conversation(&*state.store, &username, &req.messages).await?;
    Ok(Json(SaveConversationResponse { success: true }))
}
