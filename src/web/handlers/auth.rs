//! Authentication handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::{generate_password, hash_password, validate_password, verify_password};
use crate::db::{NewUser, UserRepository};
use crate::web::dto::{
    ApiResponse, AuthResponse, ExternalLoginRequest, LoginRequest, RegisterRequest,
};
use crate::web::error::ApiError;
use crate::TaskdeckError;

use super::AppState;

fn require_email(email: &str) -> Result<&str, ApiError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    Ok(email)
}

/// POST /api/auth/register - Register a new account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    // Validate input
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    let email = require_email(&req.email)?;

    // Validate and hash the password; the digest is always derived here,
    // never accepted pre-hashed
    validate_password(&req.password)
        .map_err(|e| ApiError::unprocessable(format!("Password error: {}", e)))?;
    let password_hash = hash_password(&req.password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .create(&NewUser::new(email, password_hash, req.name.trim()))
        .await
        .map_err(|e| state.api_error(e))?;

    let token = state.issue_token(&user)?;
    tracing::info!(user_id = %user.id, "account registered");

    Ok(Json(ApiResponse::new(AuthResponse {
        token,
        expires_in: state.tokens.ttl_secs(),
        user: user.into(),
    })))
}

/// POST /api/auth/login - Authenticate and get a bearer token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let repo = UserRepository::new(state.db.pool());

    // Unknown email and wrong password are indistinguishable to the caller
    let user = repo
        .get_by_email(&req.email)
        .await
        .map_err(|e| state.api_error(e))?
        .ok_or_else(|| state.api_error(TaskdeckError::InvalidCredentials))?;

    verify_password(&req.password, &user.password)
        .map_err(|_| state.api_error(TaskdeckError::InvalidCredentials))?;

    let token = state.issue_token(&user)?;
    tracing::debug!(user_id = %user.id, "login succeeded");

    Ok(Json(ApiResponse::new(AuthResponse {
        token,
        expires_in: state.tokens.ttl_secs(),
        user: user.into(),
    })))
}

/// POST /api/auth/external - Log in with an externally-verified identity.
///
/// The request carries an `(email, name, avatar_url)` triple already verified
/// by the external-identity collaborator. An existing account with that email
/// is logged in; otherwise one is registered with a generated random password
/// that is never revealed to anyone.
pub async fn external_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExternalLoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    let email = require_email(&req.email)?;

    let repo = UserRepository::new(state.db.pool());

    let user = match repo
        .get_by_email(email)
        .await
        .map_err(|e| state.api_error(e))?
    {
        Some(user) => user,
        None => {
            let password_hash = hash_password(&generate_password())
                .map_err(|_| ApiError::internal("Failed to hash password"))?;

            let mut new_user = NewUser::new(email, password_hash, req.name.trim());
            if let Some(avatar_url) = req.avatar_url.filter(|u| !u.trim().is_empty()) {
                new_user = new_user.with_avatar_url(avatar_url);
            }

            let user = repo
                .create(&new_user)
                .await
                .map_err(|e| state.api_error(e))?;
            tracing::info!(user_id = %user.id, "account registered via external identity");
            user
        }
    };

    let token = state.issue_token(&user)?;

    Ok(Json(ApiResponse::new(AuthResponse {
        token,
        expires_in: state.tokens.ttl_secs(),
        user: user.into(),
    })))
}
