//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use pointage_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Unauthorized(&'static str),

  #[error("{0}")]
  Forbidden(&'static str),

  #[error("{0}")]
  BadRequest(String),

  #[error(transparent)]
  Domain(#[from] CoreError),

  #[error(transparent)]
  Sheet(#[from] pointage_sheet::Error),

  #[error("internal error: {0}")]
  Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Lift a backend error into an [`ApiError`], keeping its domain meaning.
pub(crate) fn store_err<E: Into<CoreError>>(e: E) -> ApiError {
  ApiError::Domain(e.into())
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::Sheet(e) if e.is_write() => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::BadRequest(_) | ApiError::Sheet(_) => StatusCode::BAD_REQUEST,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      ApiError::Domain(e) => match e {
        CoreError::Validation(_)
        | CoreError::DuplicatePerson { .. }
        | CoreError::DuplicateUsername(_)
        | CoreError::WrongPassword => StatusCode::BAD_REQUEST,
        CoreError::MemberNotFound(_) | CoreError::AdminNotFound(_) => {
          StatusCode::NOT_FOUND
        }
        CoreError::ProtectedAdmin(_) => StatusCode::FORBIDDEN,
        CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  /// Stable machine-readable discriminant for clients.
  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Unauthorized(_) => "unauthorized",
      ApiError::Forbidden(_) => "forbidden",
      ApiError::BadRequest(_) => "bad_request",
      ApiError::Sheet(e) if e.is_write() => "internal",
      ApiError::Sheet(_) => "invalid_sheet",
      ApiError::Internal(_) => "internal",
      ApiError::Domain(e) => e.code(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
      "internal server error".to_owned()
    } else {
      self.to_string()
    };

    let body = json!({ "success": false, "error": message, "code": self.code() });
    (status, Json(body)).into_response()
  }
}
