//! Administrator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AdminId, Error, Result};

/// The bootstrap superadmin. Never deletable, whoever asks.
pub const PROTECTED_ADMIN_ID: AdminId = 1;
/// Shortest password accepted for new accounts and password changes.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AdminRole {
  Admin,
  Superadmin,
}

/// Public view of an account; the password hash never leaves the store
/// through this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
  pub admin_id:   AdminId,
  pub username:   String,
  pub role:       AdminRole,
  pub created_at: DateTime<Utc>,
}

/// An account together with its stored PHC hash, for credential checks.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
  pub admin:         Admin,
  pub password_hash: String,
}

/// Reject passwords shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn validate_new_password(password: &str) -> Result<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::Validation(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters long"
    )));
  }
  Ok(())
}

/// Reject blank usernames; returns the trimmed form.
pub fn validate_username(username: &str) -> Result<&str> {
  let trimmed = username.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation("username is required".into()));
  }
  Ok(trimmed)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn password_length_boundary() {
    assert!(validate_new_password("12345").is_err());
    assert!(validate_new_password("123456").is_ok());
    // Counted in characters, not bytes.
    assert!(validate_new_password("ééééé").is_err());
  }

  #[test]
  fn role_round_trips_through_text() {
    assert_eq!(AdminRole::Superadmin.to_string(), "superadmin");
    assert_eq!("admin".parse::<AdminRole>().unwrap(), AdminRole::Admin);
  }
}
