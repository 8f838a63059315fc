use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Per-department limits on remote work. At most one policy exists per
/// department; departments without one fall back to [`RemotePolicy::fallback`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePolicy {
    pub department: String,
    /// Maximum REMOTE days per ISO week (Monday through Sunday).
    pub weekly_limit: u32,
    /// Maximum REMOTE days per calendar month.
    pub monthly_limit: u32,
    /// Minimum lead time, in hours, between "now" and the start of the
    /// target day.
    pub cutoff_hours_before: i64,
    /// Weekdays that can never be set remote.
    pub required_office_days: Vec<Weekday>,
}

impl RemotePolicy {
    pub const FALLBACK_WEEKLY_LIMIT: u32 = 2;
    pub const FALLBACK_MONTHLY_LIMIT: u32 = 8;
    pub const FALLBACK_CUTOFF_HOURS: i64 = 18;

    /// The fixed default applied when a department has no policy of its own.
    pub fn fallback(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            weekly_limit: Self::FALLBACK_WEEKLY_LIMIT,
            monthly_limit: Self::FALLBACK_MONTHLY_LIMIT,
            cutoff_hours_before: Self::FALLBACK_CUTOFF_HOURS,
            required_office_days: Vec::new(),
        }
    }

    pub fn requires_office_on(&self, weekday: Weekday) -> bool {
        self.required_office_days.contains(&weekday)
    }
}
