//! Read-only aggregates over members and events.
//!
//! Backends run the grouping queries; the helpers here normalise labels and
//! shape the results so every backend reports the same way.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::MemberId;

/// Label used for blank or missing gender/affiliation values.
pub const UNSPECIFIED_LABEL: &str = "Non spécifié";
/// Trailing window used by daily statistics when none is requested.
pub const DEFAULT_DAILY_WINDOW: u32 = 7;
/// Upper bound on the trailing window.
pub const MAX_DAILY_WINDOW: u32 = 366;
pub const DEFAULT_TOP_MEMBERS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  /// Active members.
  pub total_members: u64,
  /// Active members whose latest event is an entry.
  pub present_now:   u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
  pub label: String,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberVisits {
  pub member_id: MemberId,
  pub name:      String,
  pub surname:   String,
  pub entries:   u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
  pub day:     NaiveDate,
  pub entries: u64,
}

/// Map blank and missing labels to [`UNSPECIFIED_LABEL`].
pub fn normalize_label(raw: Option<&str>) -> String {
  match raw.map(str::trim) {
    Some(s) if !s.is_empty() => s.to_owned(),
    _ => UNSPECIFIED_LABEL.to_owned(),
  }
}

/// Normalise labels, merge the groups that collapse together, and sort by
/// count (desc) then label.
pub fn merge_counts<I>(groups: I) -> Vec<LabelCount>
where
  I: IntoIterator<Item = (Option<String>, u64)>,
{
  let mut merged: HashMap<String, u64> = HashMap::new();
  for (label, count) in groups {
    *merged.entry(normalize_label(label.as_deref())).or_default() += count;
  }
  sorted(merged)
}

/// Count each motif of each reason independently. A single reason may hold
/// several comma-separated motifs.
pub fn tally_reasons<'a, I>(reasons: I) -> Vec<LabelCount>
where
  I: IntoIterator<Item = &'a str>,
{
  let mut counts: HashMap<String, u64> = HashMap::new();
  for motif in reasons
    .into_iter()
    .flat_map(|r| r.split(','))
    .map(str::trim)
    .filter(|m| !m.is_empty())
  {
    *counts.entry(motif.to_owned()).or_default() += 1;
  }
  sorted(counts)
}

/// Expand sparse per-day counts into one entry per day of the window ending
/// on `last_day` (inclusive), oldest first.
pub fn daily_series(
  last_day: NaiveDate,
  days: u32,
  counts: &[(NaiveDate, u64)],
) -> Vec<DailyCount> {
  let days = days.clamp(1, MAX_DAILY_WINDOW);
  let by_day: HashMap<NaiveDate, u64> = counts.iter().copied().collect();
  (0..days)
    .rev()
    .filter_map(|back| last_day.checked_sub_days(Days::new(u64::from(back))))
    .map(|day| DailyCount {
      day,
      entries: by_day.get(&day).copied().unwrap_or(0),
    })
    .collect()
}

fn sorted(counts: HashMap<String, u64>) -> Vec<LabelCount> {
  let mut out: Vec<LabelCount> = counts
    .into_iter()
    .map(|(label, count)| LabelCount { label, count })
    .collect();
  out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
  out
}
