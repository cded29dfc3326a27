//! Members: the people whose presence is tracked.
//!
//! A member is never hard-deleted. Deactivation flips [`MemberStatus`] to
//! `Inactive`, which hides the member from search and presence while keeping
//! every historical event pointing at a valid row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, MemberId, Result};

/// Gender recorded when the caller leaves it blank.
pub const DEFAULT_GENDER: &str = "Non spécifié";
/// Affiliation recorded when the caller leaves it blank.
pub const DEFAULT_AFFILIATION: &str = "Membre";
/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 10;
/// Shortest phone fragment accepted by search-as-you-type.
pub const MIN_SEARCH_FRAGMENT: usize = 3;

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MemberStatus {
  Active,
  Inactive,
}

// ─── Member ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
  pub member_id:     MemberId,
  /// Family name.
  pub name:          String,
  /// Given name.
  pub surname:       String,
  pub phone:         String,
  pub gender:        String,
  pub affiliation:   String,
  /// Server-assigned timestamp.
  pub registered_at: DateTime<Utc>,
  pub status:        MemberStatus,
}

impl Member {
  pub fn is_active(&self) -> bool { self.status == MemberStatus::Active }

  pub fn identity(&self) -> MemberIdentity {
    MemberIdentity {
      name:        self.name.clone(),
      surname:     self.surname.clone(),
      affiliation: self.affiliation.clone(),
    }
  }
}

/// What an operator sees on the kiosk after a presence event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberIdentity {
  pub name:        String,
  pub surname:     String,
  pub affiliation: String,
}

// ─── NewMember ───────────────────────────────────────────────────────────────

/// Unvalidated input for creating a member, as received from a form or a
/// spreadsheet row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMember {
  #[serde(default)]
  pub name:        String,
  #[serde(default)]
  pub surname:     String,
  #[serde(default)]
  pub phone:       String,
  pub gender:      Option<String>,
  pub affiliation: Option<String>,
}

/// A [`NewMember`] that passed [`NewMember::validate`]. Fields are trimmed and
/// defaults applied; only this crate can build one.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ValidMember {
  pub name:         String,
  pub surname:      String,
  pub phone:        String,
  pub gender:       String,
  pub affiliation:  String,
  /// Case-folded `(name, surname)` used for duplicate detection.
  pub identity_key: String,
}

impl NewMember {
  pub fn validate(self) -> Result<ValidMember> {
    let name = self.name.trim();
    let surname = self.surname.trim();
    let phone = self.phone.trim();

    if name.is_empty() || surname.is_empty() || phone.is_empty() {
      return Err(Error::Validation(format!(
        "name, surname and phone are required (name: {name:?}, surname: \
         {surname:?}, phone: {phone:?})"
      )));
    }

    if !is_valid_phone(phone) {
      return Err(Error::Validation(format!(
        "phone must contain at least {MIN_PHONE_DIGITS} digits and nothing \
         else, got {phone:?}"
      )));
    }

    Ok(ValidMember {
      identity_key: identity_key(name, surname),
      name:         name.to_owned(),
      surname:      surname.to_owned(),
      phone:        phone.to_owned(),
      gender:       or_default(self.gender.as_deref(), DEFAULT_GENDER),
      affiliation:  or_default(self.affiliation.as_deref(), DEFAULT_AFFILIATION),
    })
  }
}

/// Key under which two members count as the same person. Phone is
/// intentionally not part of it.
pub fn identity_key(name: &str, surname: &str) -> String {
  format!(
    "{}\u{1f}{}",
    name.trim().to_lowercase(),
    surname.trim().to_lowercase()
  )
}

pub fn is_valid_phone(phone: &str) -> bool {
  phone.len() >= MIN_PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a phone fragment is long enough to be worth searching for.
pub fn is_searchable_fragment(fragment: &str) -> bool {
  fragment.trim().chars().count() >= MIN_SEARCH_FRAGMENT
}

fn or_default(value: Option<&str>, default: &str) -> String {
  match value.map(str::trim) {
    Some(v) if !v.is_empty() => v.to_owned(),
    _ => default.to_owned(),
  }
}
