//! HS256 session tokens.
//!
//! A token is self-contained: verification checks the signature and expiry
//! only and never touches the store.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use pointage_core::{
  AdminId,
  admin::{Admin, AdminRole},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// The admin's id.
  pub sub:      AdminId,
  pub username: String,
  pub role:     AdminRole,
  /// Expiration time (UTC Unix timestamp).
  pub exp:      i64,
  /// Issued-at time (UTC Unix timestamp).
  pub iat:      i64,
  /// Unique token identifier, for audit.
  pub jti:      String,
}

/// Signing material and token lifetime. Read-only after startup.
#[derive(Clone)]
pub struct JwtConfig {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl JwtConfig {
  pub fn new(secret: &str, ttl_hours: i64) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      ttl:      Duration::hours(ttl_hours),
    }
  }

  pub fn issue(&self, admin: &Admin) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
      sub:      admin.admin_id,
      username: admin.username.clone(),
      role:     admin.role,
      exp:      (now + self.ttl).timestamp(),
      iat:      now.timestamp(),
      jti:      Uuid::new_v4().to_string(),
    };
    encode(&Header::default(), &claims, &self.encoding)
  }

  pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
    Ok(data.claims)
  }

  #[cfg(test)]
  pub(crate) fn sign(&self, claims: &Claims) -> String {
    encode(&Header::default(), claims, &self.encoding).unwrap()
  }
}
