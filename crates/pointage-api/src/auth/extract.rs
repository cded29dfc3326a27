//! Bearer-token extractors.
//!
//! Put [`AuthAdmin`] in a handler's arguments to require any signed-in
//! admin, or [`RequireSuperadmin`] to require the superadmin role.

use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use pointage_core::{AdminId, admin::AdminRole, store::AttendanceStore};

use crate::{AppState, error::ApiError};

/// The admin a request was authenticated as, taken from verified claims.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
  pub admin_id: AdminId,
  pub username: String,
  pub role:     AdminRole,
}

impl AuthAdmin {
  pub fn is_superadmin(&self) -> bool { self.role == AdminRole::Superadmin }
}

impl<S> FromRequestParts<AppState<S>> for AuthAdmin
where
  S: AttendanceStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header_val = parts
      .headers
      .get(header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized("missing bearer token"))?;

    let token = header_val
      .strip_prefix("Bearer ")
      .ok_or(ApiError::Unauthorized("expected `Authorization: Bearer <token>`"))?;

    let claims = state.jwt.verify(token.trim()).map_err(|e| {
      tracing::debug!(error = %e, "rejected token");
      ApiError::Unauthorized("invalid or expired token")
    })?;

    Ok(AuthAdmin {
      admin_id: claims.sub,
      username: claims.username,
      role:     claims.role,
    })
  }
}

/// An [`AuthAdmin`] holding the superadmin role.
#[derive(Debug, Clone)]
pub struct RequireSuperadmin(pub AuthAdmin);

impl<S> FromRequestParts<AppState<S>> for RequireSuperadmin
where
  S: AttendanceStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let admin = AuthAdmin::from_request_parts(parts, state).await?;
    if !admin.is_superadmin() {
      tracing::warn!(
        admin_id = admin.admin_id,
        path = %parts.uri.path(),
        "superadmin role required"
      );
      return Err(ApiError::Forbidden("superadmin role required"));
    }
    Ok(RequireSuperadmin(admin))
  }
}
