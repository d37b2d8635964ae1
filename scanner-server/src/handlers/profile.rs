//! Profile settings handlers

use axum::{extract::State, Json};
use validator::Validate;

use crate::{AppState, AppResult, AppError};
use crate::models::{UpdateProfile, User, UserInfo};
use crate::middleware::auth::UserContext;

pub async fn get(
    State(state): State<AppState>,
    user: UserContext,
) -> AppResult<Json<UserInfo>> {
    let user = User::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.to_info()))
}

pub async fn update(
    State(state): State<AppState>,
    user: UserContext,
    Json(req): Json<UpdateProfile>,
) -> AppResult<Json<UserInfo>> {
    req.validate()?;

    if let Some(username) = &req.username {
        if User::username_taken(&state.pool, username, user.user_id).await? {
            return Err(AppError::AlreadyExists("Username already taken".to_string()));
        }
    }

    let updated = User::update_profile(&state.pool, user.user_id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!("Profile updated: {}", updated.id);

    Ok(Json(updated.to_info()))
}
