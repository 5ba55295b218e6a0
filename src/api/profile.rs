use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::state::AppState;
use crate::db::models::UserUpsert;
use crate::db::UserRepository;
use crate::error::AppError;
use crate::profile::{self, UserProfile};

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user_id: String,
}

/// GET /api/profile/{username}
///
/// An unknown username is a 200 with a JSON `null` body, not an error.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Option<UserProfile>>, AppError> {
    if username.trim().is_empty() {
        return Err(AppError::Invalid("username must not be empty".to_string()));
    }

    let profile = profile::get_user_profile(&*state.store, &username).await?;
    Ok(Json(profile))
}

/// POST /api/users
pub async fn create_or_update_user(
    State(state): State<AppState>,
    Json(req): Json<UserUpsert>,
) -> Result<Json<CreateUserResponse>, AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::Invalid("username must not be empty".to_string()));
    }

    let user_id = UserRepository::create_or_update(&*state.store, &req).await?;
    Ok(Json(CreateUserResponse { user_id }))
}
