//! Session token codec.
//!
//! Issues and verifies the stateless bearer tokens that bind a request to an
//! account. Tokens are HS256 JWTs carrying the subject id and an expiry;
//! there is no server-side session state and no revocation list, so validity
//! is exactly: signature valid and not yet expired.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::UserId;

/// Token verification/issuance errors.
///
/// `Expired` and `Invalid` both surface to HTTP callers as 401, but the
/// distinction is kept for logging.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Well-formed and correctly signed, but past its expiry.
    #[error("token expired")]
    Expired,

    /// Malformed, tampered with, or signed with a different secret.
    #[error("invalid token")]
    Invalid,

    /// Token could not be encoded.
    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: UserId,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

/// Signs and verifies session tokens with a process-wide secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenCodec {
    /// Create a codec from a secret key and token lifetime.
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        // No clock leeway: a token is expired the second its exp passes
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a signed token for the given subject.
    pub fn issue(&self, subject: UserId) -> Result<String, TokenError> {
        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            sub: subject,
            iat: now,
            exp: now + self.ttl_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify a token and return its claims.
    ///
    /// Both the signature check and the expiry check are mandatory. An
    /// expired-but-authentic token fails distinctly from a tampered one.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
