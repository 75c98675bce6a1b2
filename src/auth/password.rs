//! Password hashing and validation for taskdeck.
//!
//! Uses Argon2id for secure password hashing. Digests are always derived
//! from a caller-supplied plaintext; a pre-hashed value is never accepted.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::distr::Alphanumeric;
use rand::Rng;
use rand_core::OsRng;
use thiserror::Error;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Length of generated passwords for externally-authenticated accounts.
const GENERATED_PASSWORD_LENGTH: usize = 32;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password is too short.
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Password is too long.
    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Password hash is invalid.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Password verification failed (wrong password).
    #[error("password verification failed")]
    VerificationFailed,
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted hash string that includes the salt and parameters.
/// The salt is random per call, so hashing the same plaintext twice yields
/// different digests.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    // Validate password length first
    validate_password(password)?;

    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns `Ok(())` if the password matches. Comparison happens inside the
/// Argon2 verifier in constant time; the plaintext is never re-derived and
/// string-compared.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    // Parameters are taken from the parsed hash
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// Validate password requirements.
///
/// Checks minimum (8) and maximum (128) length, counted in bytes.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}

/// Generate a random plaintext password.
///
/// Used for accounts created through external-identity login, which have no
/// locally chosen password. The generated value is hashed and discarded; it
/// is never returned to any caller.
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_success() {
        let hash = hash_password("test_password_123").unwrap();

        // Should be a valid PHC string
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_password_different_hashes() {
        let password = "same_password";
        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();

        // Same password should produce different hashes (different salts)
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct_password";
        let hash = hash_password(password).unwrap();

        assert!(verify_password(password, &hash).is_ok());
    }

    #[test]
    fn test_verify_password_wrong() {
        let hash = hash_password("correct_password").unwrap();

        let result = verify_password("wrong_password", &hash);
        assert!(matches!(result, Err(PasswordError::VerificationFailed)));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("any_password", "not_a_valid_hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(PasswordError::TooShort)
        ));
    }

    #[test]
    fn test_validate_password_boundaries() {
        // Exactly 8 and exactly 128 characters are accepted
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"a".repeat(128)).is_ok());

        assert!(matches!(
            validate_password(&"a".repeat(129)),
            Err(PasswordError::TooLong)
        ));
    }

    #[test]
    fn test_hash_rejects_invalid_length() {
        assert!(matches!(hash_password("short"), Err(PasswordError::TooShort)));
        assert!(matches!(
            hash_password(&"a".repeat(129)),
            Err(PasswordError::TooLong)
        ));
    }

    #[test]
    fn test_password_with_special_chars() {
        let password = "p@$$w0rd!#$%^&*()";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).is_ok());
    }

    #[test]
    fn test_generate_password_valid_and_unique() {
        let a = generate_password();
        let b = generate_password();

        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
        // Generated passwords always satisfy the local policy
        assert!(validate_password(&a).is_ok());
        // And can be hashed and verified like any other plaintext
        let hash = hash_password(&a).unwrap();
        assert!(verify_password(&a, &hash).is_ok());
    }
}
