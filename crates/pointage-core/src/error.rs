//! Error types for `pointage-core`.

use thiserror::Error;

use crate::{AdminId, MemberId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(String),

  #[error("member not found: {0}")]
  MemberNotFound(MemberId),

  #[error("admin not found: {0}")]
  AdminNotFound(AdminId),

  #[error("a member named {name} {surname} already exists")]
  DuplicatePerson { name: String, surname: String },

  #[error("username {0:?} is already taken")]
  DuplicateUsername(String),

  #[error("admin {0} is protected and cannot be deleted")]
  ProtectedAdmin(AdminId),

  #[error("current password is incorrect")]
  WrongPassword,

  #[error("storage failure: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Stable machine-readable discriminant, exposed to API clients so they
  /// can tell form errors apart from server errors.
  pub fn code(&self) -> &'static str {
    match self {
      Self::Validation(_) => "validation",
      Self::MemberNotFound(_) | Self::AdminNotFound(_) => "not_found",
      Self::DuplicatePerson { .. } => "duplicate_person",
      Self::DuplicateUsername(_) => "duplicate_username",
      Self::ProtectedAdmin(_) => "protected_admin",
      Self::WrongPassword => "wrong_password",
      Self::Storage(_) => "storage",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
