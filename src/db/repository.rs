//! User repository for taskdeck.
//!
//! This module provides CRUD operations for users in the database.

use chrono::Utc;
use sqlx::{QueryBuilder, SqlitePool};

use super::ids::UserId;
use super::user::{normalize_email, NewUser, User, UserUpdate};
use crate::{Result, TaskdeckError};

/// Map a sqlx error to the crate error, folding unique-constraint
/// violations on the email column into `DuplicateEmail`.
fn map_insert_error(e: sqlx::Error) -> TaskdeckError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return TaskdeckError::DuplicateEmail;
        }
    }
    TaskdeckError::Database(e.to_string())
}

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// The email is normalized before insert. Returns `DuplicateEmail` if an
    /// account with the same normalized email already exists.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, password, name, avatar_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(normalize_email(&new_user.email))
        .bind(&new_user.password)
        .bind(&new_user.name)
        .bind(&new_user.avatar_url)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(map_insert_error)?;

        let id = UserId(result.last_insert_rowid());
        self.get_by_id(id)
            .await?
            .ok_or_else(|| TaskdeckError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, email, password, name, avatar_url, created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Get a user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, email, password, name, avatar_url, created_at, updated_at
             FROM users WHERE email = ? COLLATE NOCASE",
        )
        .bind(normalize_email(email))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| TaskdeckError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Update a user by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated user, or None if not found. An email change that
    /// collides with an existing account fails with `DuplicateEmail`.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<Option<User>> {
        if update.is_empty() {
            return self.get_by_id(id).await;
        }

        let mut query: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref email) = update.email {
            separated.push("email = ");
            separated.push_bind_unseparated(normalize_email(email));
        }
        if let Some(ref password) = update.password {
            separated.push("password = ");
            separated.push_bind_unseparated(password);
        }
        if let Some(ref name) = update.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(ref avatar_url) = update.avatar_url {
            separated.push("avatar_url = ");
            separated.push_bind_unseparated(avatar_url.clone());
        }
        separated.push("updated_at = ");
        separated.push_bind_unseparated(Utc::now());

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query
            .build()
            .execute(self.pool)
            .await
            .map_err(map_insert_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| TaskdeckError::Database(e.to_string()))?;
        Ok(count.0)
    }
}
