//! Bearer-token authentication middleware.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{Claims, TokenCodec, TokenError};
use crate::web::error::ApiError;

/// Extractor for authenticated requests.
///
/// Requires a valid `Authorization: Bearer <token>` header. The handler
/// receives the verified token claims; resolving the claims to a live user
/// record is the application state's job (`AppState::authenticate`).
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Extract the bearer token from the Authorization header
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        // Get the token codec from extensions (set by middleware)
        let codec = parts
            .extensions
            .get::<Arc<TokenCodec>>()
            .ok_or_else(|| ApiError::internal("Token codec not configured"))?;

        let claims = codec.verify(token).map_err(|e| {
            // Expired and tampered tokens get the same response but are
            // logged distinctly
            match e {
                TokenError::Expired => tracing::debug!("rejected expired token"),
                _ => tracing::debug!("rejected invalid token"),
            }
            ApiError::unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(claims))
    }
}

/// Middleware function to inject the token codec into request extensions.
pub async fn token_auth(
    codec: Arc<TokenCodec>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(codec);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::UserId;

    #[test]
    fn test_issue_then_claims_subject() {
        let codec = TokenCodec::new("test-secret", 3600);
        let token = codec.issue(UserId(12)).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, UserId(12));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let codec = TokenCodec::new("secret-a", 3600);
        let other = TokenCodec::new("secret-b", 3600);

        let token = codec.issue(UserId(1)).unwrap();
        assert!(other.verify(&token).is_err());
    }
}
