//! Web API handlers and shared application state.

mod auth;
mod task;
mod user;

pub use auth::{external_login, login, register};
pub use task::{
    add_subtask, create_task, delete_subtask, delete_task, get_task, list_tasks, update_subtask,
    update_task,
};
pub use user::{change_password, get_my_profile, update_my_profile};

use std::sync::Arc;

use crate::auth::{Claims, TokenCodec};
use crate::db::{Database, User, UserRepository};
use crate::web::error::ApiError;
use crate::TaskdeckError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,
    /// Session token codec.
    pub tokens: Arc<TokenCodec>,
    expose_internal_errors: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Database, jwt_secret: &str, token_ttl_secs: u64) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenCodec::new(jwt_secret, token_ttl_secs)),
            expose_internal_errors: false,
        }
    }

    /// Include internal error detail in 500 responses (development only).
    pub fn with_expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Authentication gate: resolve verified token claims to a live user.
    ///
    /// A token whose subject no longer exists is rejected as unauthenticated;
    /// issued tokens are not proactively invalidated, so this is where the
    /// staleness window closes.
    pub async fn authenticate(&self, claims: &Claims) -> Result<User, ApiError> {
        let repo = UserRepository::new(self.db.pool());
        repo.get_by_id(claims.sub)
            .await
            .map_err(|e| self.api_error(e))?
            .ok_or_else(|| {
                tracing::debug!(subject = %claims.sub, "token subject no longer exists");
                self.api_error(TaskdeckError::Unauthenticated(
                    "Invalid or expired token".to_string(),
                ))
            })
    }

    /// Convert a core error to an API error, honoring the development flag
    /// for internal error detail.
    pub fn api_error(&self, err: TaskdeckError) -> ApiError {
        match &err {
            TaskdeckError::Database(_) | TaskdeckError::Io(_) | TaskdeckError::Config(_)
                if self.expose_internal_errors =>
            {
                tracing::error!("Internal error: {}", err);
                ApiError::internal(err.to_string())
            }
            _ => ApiError::from(err),
        }
    }

    /// Issue a bearer token for a user.
    pub fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        self.tokens.issue(user.id).map_err(|e| {
            tracing::error!("Failed to issue token: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}
