//! Validation utilities for Web API DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Deserializes the request body as JSON and then validates it using the
/// `validator` crate. Validation failures return a detailed response with
/// field-level error information.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First, extract the JSON body
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))?;

        // Then, validate the deserialized value
        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

// ============================================================================
// Custom Validators
// ============================================================================

/// Validate that a string is not empty after trimming whitespace.
pub fn not_empty_trimmed(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("not_empty_trimmed")
            .with_message("Must not be empty".into()));
    }
    Ok(())
}

/// Validate that a string does not contain control characters or NULL bytes.
pub fn no_control_chars(value: &str) -> Result<(), validator::ValidationError> {
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(validator::ValidationError::new("no_control_chars")
            .with_message("Must not contain control characters".into()));
    }
    Ok(())
}
