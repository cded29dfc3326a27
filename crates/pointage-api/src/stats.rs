//! Read-only reporting endpoints. All require an admin token.

use axum::extract::State;
use pointage_core::{
  report::{
    DEFAULT_DAILY_WINDOW, DEFAULT_TOP_MEMBERS, DailyCount, LabelCount,
    MemberVisits, Summary,
  },
  store::AttendanceStore,
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::AuthAdmin,
  error::{ApiResult, store_err},
  extract::{Json, Query},
};

/// `GET /stats`
pub async fn summary<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
) -> ApiResult<Json<Summary>>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.store.summary().await.map_err(store_err)?))
}

/// `GET /stats/gender`
pub async fn by_gender<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
) -> ApiResult<Json<Vec<LabelCount>>>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.store.count_by_gender().await.map_err(store_err)?))
}

/// `GET /stats/affiliation`
pub async fn by_affiliation<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
) -> ApiResult<Json<Vec<LabelCount>>>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(
    state.store.count_by_affiliation().await.map_err(store_err)?,
  ))
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
  pub limit: Option<u32>,
}

/// `GET /stats/top-members[?limit=N]`
pub async fn top_members<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
  Query(params): Query<TopParams>,
) -> ApiResult<Json<Vec<MemberVisits>>>
where
  S: AttendanceStore + 'static,
{
  let limit = params.limit.unwrap_or(DEFAULT_TOP_MEMBERS);
  Ok(Json(state.store.top_members(limit).await.map_err(store_err)?))
}

#[derive(Debug, Deserialize)]
pub struct DailyParams {
  pub days: Option<u32>,
}

/// `GET /stats/daily[?days=N]`: oldest day first, gaps filled with zero.
pub async fn daily<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
  Query(params): Query<DailyParams>,
) -> ApiResult<Json<Vec<DailyCount>>>
where
  S: AttendanceStore + 'static,
{
  let days = params.days.unwrap_or(DEFAULT_DAILY_WINDOW);
  Ok(Json(state.store.daily_entries(days).await.map_err(store_err)?))
}

/// `GET /stats/reasons`
pub async fn reasons<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
) -> ApiResult<Json<Vec<LabelCount>>>
where
  S: AttendanceStore + 'static,
{
  Ok(Json(state.store.reason_tally().await.map_err(store_err)?))
}
