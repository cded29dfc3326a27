//! Liveness probe and destructive maintenance.

use axum::{Json, extract::State};
use pointage_core::store::AttendanceStore;
use serde_json::{Value, json};

use crate::{
  AppState,
  auth::RequireSuperadmin,
  error::{ApiResult, store_err},
};

/// `GET /health`
pub async fn health() -> Json<Value> {
  Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// `POST /reset`: deletes every member and every event. Admin accounts
/// survive.
pub async fn reset<S>(
  State(state): State<AppState<S>>,
  RequireSuperadmin(caller): RequireSuperadmin,
) -> ApiResult<Json<Value>>
where
  S: AttendanceStore + 'static,
{
  let counts = state.store.reset_members().await.map_err(store_err)?;
  tracing::warn!(
    admin_id = caller.admin_id,
    members = counts.members,
    events = counts.events,
    "database reset"
  );
  Ok(Json(json!({
    "success": true,
    "message": format!(
      "{} members and {} events deleted",
      counts.members, counts.events
    ),
    "deleted": counts,
  })))
}
