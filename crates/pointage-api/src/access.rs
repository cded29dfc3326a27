//! Handlers for sign-in, password changes and admin accounts.
//!
//! | Method   | Path               | Auth       |
//! |----------|--------------------|------------|
//! | `POST`   | `/login`           | public     |
//! | `POST`   | `/change-password` | admin      |
//! | `GET`    | `/admins`          | superadmin |
//! | `POST`   | `/admins`          | superadmin |
//! | `DELETE` | `/admins/{id}`     | superadmin |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use pointage_core::{
  AdminId, Error as CoreError,
  admin::{Admin, AdminRole, validate_new_password, validate_username},
  store::AttendanceStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  AppState,
  auth::{
    AuthAdmin, RequireSuperadmin,
    password::{hash_blocking, verify_blocking},
  },
  error::{ApiError, ApiResult, store_err},
  extract::{Json, Path},
};

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Credentials {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub success:  bool,
  pub token:    String,
  pub role:     AdminRole,
  pub username: String,
  pub message:  &'static str,
}

/// `POST /login`: body: `{"username":"…","password":"…"}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<Credentials>,
) -> ApiResult<Json<LoginResponse>>
where
  S: AttendanceStore + 'static,
{
  let username = body.username.trim();
  if username.is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest(
      "username and password are required".into(),
    ));
  }

  let creds = state
    .store
    .find_admin_by_username(username.to_owned())
    .await
    .map_err(store_err)?;

  let Some(creds) = creds else {
    tracing::warn!(username, "login failed: unknown user");
    return Err(ApiError::Unauthorized("invalid credentials"));
  };

  if !verify_blocking(body.password, creds.password_hash).await? {
    tracing::warn!(username, "login failed: wrong password");
    return Err(ApiError::Unauthorized("invalid credentials"));
  }

  let admin = creds.admin;
  let token = state
    .jwt
    .issue(&admin)
    .map_err(|e| ApiError::Internal(format!("token signing: {e}")))?;

  tracing::info!(admin_id = admin.admin_id, role = %admin.role, "login");
  Ok(Json(LoginResponse {
    success: true,
    token,
    role: admin.role,
    username: admin.username,
    message: "login successful",
  }))
}

// ─── Change password ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChangePasswordBody {
  #[serde(default, alias = "oldPassword")]
  pub old_password: String,
  #[serde(default, alias = "newPassword")]
  pub new_password: String,
}

/// `POST /change-password`: body: `{"old_password":"…","new_password":"…"}`
pub async fn change_password<S>(
  State(state): State<AppState<S>>,
  admin: AuthAdmin,
  Json(body): Json<ChangePasswordBody>,
) -> ApiResult<impl IntoResponse>
where
  S: AttendanceStore + 'static,
{
  if body.old_password.is_empty() || body.new_password.is_empty() {
    return Err(
      CoreError::Validation("old and new passwords are required".into()).into(),
    );
  }
  validate_new_password(&body.new_password)?;

  let creds = state
    .store
    .get_admin_credentials(admin.admin_id)
    .await
    .map_err(store_err)?
    .ok_or(CoreError::AdminNotFound(admin.admin_id))?;

  if !verify_blocking(body.old_password, creds.password_hash.clone()).await? {
    tracing::warn!(admin_id = admin.admin_id, "password change: wrong old password");
    return Err(CoreError::WrongPassword.into());
  }

  let new_hash = hash_blocking(body.new_password).await?;
  let swapped = state
    .store
    .replace_password_hash(admin.admin_id, creds.password_hash, new_hash)
    .await
    .map_err(store_err)?;

  // The stored hash moved under us: the old password we verified is stale.
  if !swapped {
    return Err(CoreError::WrongPassword.into());
  }

  tracing::info!(admin_id = admin.admin_id, "password changed");
  Ok(Json(json!({ "success": true, "message": "password changed" })))
}

// ─── Admin accounts ──────────────────────────────────────────────────────────

/// `GET /admins`
pub async fn list_admins<S>(
  State(state): State<AppState<S>>,
  _: RequireSuperadmin,
) -> ApiResult<Json<Vec<Admin>>>
where
  S: AttendanceStore + 'static,
{
  let admins = state.store.list_admins().await.map_err(store_err)?;
  Ok(Json(admins))
}

/// `POST /admins`: body: `{"username":"…","password":"…"}`. New accounts
/// always get the `admin` role.
pub async fn create_admin<S>(
  State(state): State<AppState<S>>,
  RequireSuperadmin(caller): RequireSuperadmin,
  Json(body): Json<Credentials>,
) -> ApiResult<impl IntoResponse>
where
  S: AttendanceStore + 'static,
{
  let username = validate_username(&body.username)?.to_owned();
  validate_new_password(&body.password)?;

  let hash = hash_blocking(body.password).await?;
  let admin = state
    .store
    .add_admin(username, hash, AdminRole::Admin)
    .await
    .map_err(store_err)?;

  tracing::info!(
    admin_id = admin.admin_id,
    created_by = caller.admin_id,
    "admin created"
  );
  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "admin": admin })),
  ))
}

/// `DELETE /admins/{id}`: the bootstrap superadmin is never deletable.
pub async fn delete_admin<S>(
  State(state): State<AppState<S>>,
  RequireSuperadmin(caller): RequireSuperadmin,
  Path(id): Path<AdminId>,
) -> ApiResult<impl IntoResponse>
where
  S: AttendanceStore + 'static,
{
  state.store.delete_admin(id).await.map_err(store_err)?;

  tracing::info!(admin_id = id, deleted_by = caller.admin_id, "admin deleted");
  Ok(Json(json!({ "success": true, "message": "admin deleted" })))
}
