//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so the parameters and salt travel with
//! the hash and can be tuned later without a migration.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tally_shared::AppError;
use thiserror::Error;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Stored hash is not a valid PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,

    /// Verification failed for a reason other than a wrong password.
    #[error("failed to verify password: {0}")]
    Verify(String),
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Hashes a password with a fresh random salt.
///
/// ```
/// use tally_core::auth::hash_password;
///
/// let hash = hash_password("hunter2").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Checks a plaintext password against a stored hash.
///
/// A wrong password is `Ok(false)`; only a broken hash or an internal
/// failure is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("correct horse"));
    }

    #[test]
    fn test_verify_matches_only_original_password() {
        let hash = hash_password("correct horse").unwrap();

        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_salt_makes_hashes_unique() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("anything", "plaintext-in-the-db"),
            Err(PasswordError::MalformedHash)
        ));
    }

    #[test]
    fn test_password_error_is_internal() {
        let err: AppError = PasswordError::MalformedHash.into();
        assert_eq!(err.status_code(), 500);
    }
}
