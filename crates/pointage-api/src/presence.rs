//! Handlers for the presence toggle and the event log.

use axum::extract::State;
use pointage_core::{
  Error as CoreError, MemberId,
  event::{Movement, PresentMember},
  presence::PresenceReceipt,
  store::AttendanceStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::AuthAdmin,
  error::{ApiResult, store_err},
  extract::{Json, Query},
};

pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
pub const MAX_HISTORY_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
pub struct PointerBody {
  #[serde(default, alias = "membreId")]
  pub member_id: Option<MemberId>,
  #[serde(default, alias = "motif")]
  pub reason:    Option<String>,
}

/// `POST /pointer-by-id`: body: `{"member_id":7,"reason":"…"?}`
///
/// Public: this is what the kiosk calls on every tap.
pub async fn pointer_by_id<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<PointerBody>,
) -> ApiResult<Json<PresenceReceipt>>
where
  S: AttendanceStore + 'static,
{
  let member_id = body
    .member_id
    .ok_or_else(|| CoreError::Validation("member_id is required".into()))?;

  let receipt = state.presence.record(member_id, body.reason).await?;
  Ok(Json(receipt))
}

/// `GET /present`
pub async fn present<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
) -> ApiResult<Json<Vec<PresentMember>>>
where
  S: AttendanceStore + 'static,
{
  let present = state.store.list_present().await.map_err(store_err)?;
  Ok(Json(present))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub limit: Option<u32>,
}

/// `GET /movements[?limit=N]`: newest first.
pub async fn history<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
  Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<Movement>>>
where
  S: AttendanceStore + 'static,
{
  let limit = params
    .limit
    .unwrap_or(DEFAULT_HISTORY_LIMIT)
    .clamp(1, MAX_HISTORY_LIMIT);
  let movements = state.store.history(limit).await.map_err(store_err)?;
  Ok(Json(movements))
}
