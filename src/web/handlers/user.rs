//! User profile handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::{hash_password, validate_password, verify_password};
use crate::db::{UserRepository, UserUpdate};
use crate::web::dto::{ApiResponse, ChangePasswordRequest, ProfileResponse, UpdateProfileRequest};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::AppState;

/// GET /api/users/me - Get current user's profile.
pub async fn get_my_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let user = state.authenticate(&claims).await?;
    Ok(Json(ApiResponse::new(user.into())))
}

/// PUT /api/users/me - Update current user's profile.
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    // Build the explicit update struct
    let mut update = UserUpdate::new();

    if let Some(name) = req.name {
        if name.trim().is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
        update = update.name(name.trim());
    }

    if let Some(email) = req.email {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::bad_request("A valid email is required"));
        }
        update = update.email(email);
    }

    if let Some(avatar_url) = req.avatar_url {
        let avatar_opt = if avatar_url.trim().is_empty() {
            None
        } else {
            Some(avatar_url)
        };
        update = update.avatar_url(avatar_opt);
    }

    let repo = UserRepository::new(state.db.pool());
    let updated = repo
        .update(user.id, &update)
        .await
        .map_err(|e| state.api_error(e))?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(ApiResponse::new(updated.into())))
}

/// PUT /api/users/me/password - Change current user's password.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let user = state.authenticate(&claims).await?;

    validate_password(&req.new_password)
        .map_err(|e| ApiError::unprocessable(format!("Password error: {}", e)))?;

    // Verify current password before accepting the change
    verify_password(&req.current_password, &user.password)
        .map_err(|_| ApiError::unauthorized("Current password is incorrect"))?;

    let new_hash = hash_password(&req.new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to update password")
    })?;

    let repo = UserRepository::new(state.db.pool());
    repo.update(user.id, &UserUpdate::new().password(new_hash))
        .await
        .map_err(|e| state.api_error(e))?;

    tracing::info!(user_id = %user.id, "password changed");
    Ok(Json(ApiResponse::new(())))
}
