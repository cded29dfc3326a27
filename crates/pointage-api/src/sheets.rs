//! Spreadsheet import and export.

use axum::{
  body::Bytes,
  extract::{Multipart, State, multipart::MultipartRejection},
  http::header,
  response::IntoResponse,
};
use pointage_core::{
  import::{ImportReport, bulk_create},
  store::AttendanceStore,
};
use pointage_sheet::{SheetFormat, read_members, write_members, write_movements};
use serde::Deserialize;

use crate::{
  AppState,
  auth::AuthAdmin,
  error::{ApiError, ApiResult, store_err},
  extract::{Json, Query},
};

/// Multipart field carrying the uploaded sheet.
pub const UPLOAD_FIELD: &str = "file";

/// `POST /import`: multipart upload, field `file`. Accepts an Excel
/// workbook (first worksheet) or a CSV file.
pub async fn import<S>(
  State(state): State<AppState<S>>,
  admin: AuthAdmin,
  multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportReport>>
where
  S: AttendanceStore + 'static,
{
  let mut multipart = multipart?;
  let mut upload = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
  {
    if field.name() != Some(UPLOAD_FIELD) {
      continue;
    }
    let data = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
    upload = Some(data);
    break;
  }

  let data = upload
    .filter(|d| !d.is_empty())
    .ok_or_else(|| ApiError::BadRequest("no file provided".into()))?;

  let rows = read_members(&data)?;
  tracing::info!(
    admin_id = admin.admin_id,
    rows = rows.len(),
    bytes = data.len(),
    "member import started"
  );

  let report = bulk_create(state.store.as_ref(), rows).await;
  Ok(Json(report))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
  #[serde(default)]
  pub format: SheetFormat,
}

fn attachment(stem: &str, format: SheetFormat, body: Bytes) -> impl IntoResponse {
  (
    [
      (header::CONTENT_TYPE, format.content_type().to_owned()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{stem}.{}\"", format.extension()),
      ),
    ],
    body,
  )
}

/// `GET /export/members[?format=xlsx|csv]`: active members, as a workbook
/// unless CSV is asked for.
pub async fn export_members<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
  Query(params): Query<ExportParams>,
) -> ApiResult<impl IntoResponse>
where
  S: AttendanceStore + 'static,
{
  let members = state.store.list_members(false).await.map_err(store_err)?;
  let body = write_members(&members, params.format)?;
  Ok(attachment("members", params.format, body))
}

/// `GET /export/movements[?format=xlsx|csv]`: the whole event log, newest
/// first.
pub async fn export_movements<S>(
  State(state): State<AppState<S>>,
  _: AuthAdmin,
  Query(params): Query<ExportParams>,
) -> ApiResult<impl IntoResponse>
where
  S: AttendanceStore + 'static,
{
  let movements = state.store.all_movements().await.map_err(store_err)?;
  let body = write_movements(&movements, params.format)?;
  Ok(attachment("movements", params.format, body))
}
