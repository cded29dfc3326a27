//! Handlers for the member directory.
//!
//! | Method   | Path                          | Auth   |
//! |----------|-------------------------------|--------|
//! | `GET`    | `/search-members/{fragment}`  | public |
//! | `GET`    | `/members[?include_inactive]` | admin  |
//! | `POST`   | `/members`                    | admin  |
//! | `DELETE` | `/members/{id}`               | admin  |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use pointage_core::{
  MemberId,
  member::{Member, NewMember},
  store::AttendanceStore,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
  AppState,
  auth::AuthAdmin,
  error::{ApiResult, store_err},
  extract::{Json, Path, Query},
};

/// `GET /search-members/{fragment}`: kiosk search-as-you-type on phone
/// numbers. Fragments under three characters return an empty list.
pub async fn search<S>(
  State(state): State<AppState<S>>,
  Path(fragment): Path<String>,
) -> ApiResult<Json<Vec<Member>>>
where
  S: AttendanceStore + 'static,
{
  let members = state
    .store
    .search_by_phone(fragment)
    .await
    .map_err(store_err)?;
  Ok(Json(members))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /members`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
  Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Member>>>
where
  S: AttendanceStore + 'static,
{
  let members = state
    .store
    .list_members(params.include_inactive)
    .await
    .map_err(store_err)?;
  Ok(Json(members))
}

/// `POST /members`: body: `{"name","surname","phone","gender"?,"affiliation"?}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  admin: AuthAdmin,
  Json(body): Json<NewMember>,
) -> ApiResult<impl IntoResponse>
where
  S: AttendanceStore + 'static,
{
  let valid = body.validate()?;
  let member = state.store.add_member(valid).await.map_err(store_err)?;

  tracing::info!(
    member_id = member.member_id,
    created_by = admin.admin_id,
    "member created"
  );
  Ok((
    StatusCode::CREATED,
    Json(json!({ "success": true, "member": member })),
  ))
}

/// `DELETE /members/{id}`: soft delete; repeating it succeeds.
pub async fn deactivate<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
  Path(id): Path<MemberId>,
) -> ApiResult<impl IntoResponse>
where
  S: AttendanceStore + 'static,
{
  let member = state.store.deactivate_member(id).await.map_err(store_err)?;
  Ok(Json(json!({ "success": true, "member": member })))
}
