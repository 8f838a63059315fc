use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    Office,
    Remote,
    Pto,
    Sick,
    Holiday,
    Other,
}

/// Provenance of a calendar entry's current status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    PolicySeed,
    ApprovedRequest,
    Manual,
}

/// One status per (user, date). The store keeps at most one entry per key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: DayStatus,
    pub source: EntrySource,
    pub last_changed_at: DateTime<Utc>,
}
