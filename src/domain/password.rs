//! Password hashing for account credentials.
//!
//! Passwords are hashed with Argon2id and a random per-user salt, and the
//! resulting PHC string (`$argon2id$v=19$...`) is the only thing stored.
//! Verification re-derives the hash from the parameters encoded in that
//! string, so changing the cost parameters below does not break old hashes.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::OnceLock;

use rand::rngs::OsRng;
use thiserror::Error;

/// Errors from hashing or verifying a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored password hash is malformed")]
    InvalidHash,
}

/// Argon2id with 19 MiB memory, 2 iterations, 1 lane.
fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(19 * 1024, 2, 1, None)
        .map_err(|e| PasswordError::Hashing(format!("Invalid Argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password into a PHC string.
///
/// # Errors
/// Returns error if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch.
///
/// # Errors
/// Returns `PasswordError::InvalidHash` if `stored` cannot be parsed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::InvalidHash)?;
    match hasher()?.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hashing(e.to_string())),
    }
}

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// A hash with the current cost parameters that no user owns.
fn dummy_hash() -> Result<&'static str, PasswordError> {
    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash);
    }
    let hash = hash_password("glycocheck-unused-credential")?;
    Ok(DUMMY_HASH.get_or_init(|| hash))
}

#[cfg(test)]
pub(crate) fn dummy_hash_initialized() -> bool {
    DUMMY_HASH.get().is_some()
}

/// Spend the same work as [`verify_password`] when there is no stored hash.
///
/// Always returns `Ok(false)`. Lets a lookup miss take as long as a
/// password mismatch.
///
/// # Errors
/// Returns error if the hasher fails.
pub fn verify_against_dummy(password: &str) -> Result<bool, PasswordError> {
    verify_password(password, dummy_hash()?)?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_roundtrip() {
        let hash = hash_password("correct-horse-battery-staple").expect("Should hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash).expect("Should verify"));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("correct-horse-battery-staple").expect("Should hash");
        assert!(!verify_password("wrong-password", &hash).expect("Should verify"));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("plaintext-secret").expect("Should hash");
        assert!(!hash.contains("plaintext-secret"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("same_password").expect("Should hash");
        let b = hash_password("same_password").expect("Should hash");
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_rejected() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHash)));
    }

    #[test]
    fn test_dummy_verification_never_matches() {
        assert!(!verify_against_dummy("glycocheck-unused-credential").expect("Should verify"));
        assert!(!verify_against_dummy("anything-else").expect("Should verify"));
    }

    #[test]
    fn test_dummy_hash_uses_real_cost_parameters() {
        let real = hash_password("correct-horse-battery-staple").expect("Should hash");
        let dummy = dummy_hash().expect("Should hash");
        assert_eq!(dummy, dummy_hash().expect("Should hash"));

        let real = PasswordHash::new(&real).expect("Should parse");
        let dummy = PasswordHash::new(dummy).expect("Should parse");
        assert_eq!(real.algorithm, dummy.algorithm);
        assert_eq!(real.params, dummy.params);
    }
}
