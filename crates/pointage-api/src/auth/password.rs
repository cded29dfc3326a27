//! Argon2id password hashing and verification.
//!
//! Hashes are PHC strings with a random salt. Both operations are CPU-bound,
//! so handlers go through the `*_blocking` wrappers, which run them on
//! tokio's blocking pool.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::{self, SaltString},
};
use rand_core::OsRng;

use crate::error::ApiError;

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
  Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a usable PHC
/// string.
pub fn verify_password(
  password: &str,
  hash: &str,
) -> Result<bool, password_hash::Error> {
  let parsed = PasswordHash::new(hash)?;
  match Argon2::default().verify_password(password.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(password_hash::Error::Password) => Ok(false),
    Err(e) => Err(e),
  }
}

pub async fn hash_blocking(password: String) -> Result<String, ApiError> {
  tokio::task::spawn_blocking(move || hash_password(&password))
    .await
    .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))?
    .map_err(|e| ApiError::Internal(format!("argon2: {e}")))
}

pub async fn verify_blocking(
  password: String,
  hash: String,
) -> Result<bool, ApiError> {
  tokio::task::spawn_blocking(move || verify_password(&password, &hash))
    .await
    .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))?
    .map_err(|e| ApiError::Internal(format!("argon2: {e}")))
}
