//! Argon2 password hashing
//!
//! Hashing and verification are CPU-bound, so both run on the blocking pool.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

use crate::error::AuthError;

/// Hash a plaintext password into a PHC string
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hashing(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| AuthError::Hashing(e.to_string()))?
}

/// Check a plaintext password against a stored PHC string
pub async fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AuthError> {
    let password = password.to_owned();
    let hashed_password = hashed_password.to_owned();

    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hashed_password)
            .map_err(|e| AuthError::Hashing(format!("Failed to parse password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await
    .map_err(|e| AuthError::Hashing(e.to_string()))?
}

/// Fingerprint of a stored hash.
///
/// Every re-hash draws a fresh salt, so the fingerprint changes whenever the
/// password does.
pub fn fingerprint(hashed_password: &str) -> Option<String> {
    let parsed = PasswordHash::new(hashed_password).ok()?;
    parsed.salt.map(|salt| salt.as_str().to_string())
}
