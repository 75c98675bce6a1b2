//! User model for taskdeck.

use chrono::{DateTime, Utc};

use super::ids::UserId;

/// Normalize an email address for storage and comparison.
///
/// Emails are unique case-insensitively; the normalized form (trimmed,
/// lowercased) is what gets persisted.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (unique, stored normalized).
    pub email: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Avatar image URL (optional).
    pub avatar_url: Option<String>,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address (will be normalized on insert).
    pub email: String,
    /// Password hash (should be pre-hashed with Argon2).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Avatar image URL (optional).
    pub avatar_url: Option<String>,
}

impl NewUser {
    /// Create a new user with the required fields.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            avatar_url: None,
        }
    }

    /// Set the avatar URL.
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }
}

/// Data for updating an existing user.
///
/// Every mutable field is enumerated explicitly; there is no way to reach
/// any other column through this struct.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New email address (re-checked for uniqueness on write).
    pub email: Option<String>,
    /// New password hash (if changing password).
    pub password: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New avatar URL. `Some(None)` clears it.
    pub avatar_url: Option<Option<String>>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new email.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set new password hash.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set new display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set new avatar URL.
    pub fn avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = Some(avatar_url);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.avatar_url.is_none()
    }
}
