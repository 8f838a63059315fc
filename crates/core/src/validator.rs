use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::dates::{self, DateRange};
use crate::domain::policy::RemotePolicy;
use crate::domain::request::RequestKind;
use crate::domain::user::{Role, User};
use crate::errors::{EngineError, PolicyRejection, RejectionKind};
use crate::store::CalendarStore;

/// Decides whether a candidate date range is legal under the user's policy.
/// Pure with respect to the stores: validation never mutates anything.
pub struct RequestValidator<'a> {
    calendar: &'a dyn CalendarStore,
}

impl<'a> RequestValidator<'a> {
    pub fn new(calendar: &'a dyn CalendarStore) -> Self {
        Self { calendar }
    }

    /// Checks run per day in ascending order; the first failing check wins.
    pub fn validate(
        &self,
        user: &User,
        start: NaiveDate,
        end: NaiveDate,
        kind: RequestKind,
        policy: &RemotePolicy,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        if user.role != Role::Employee {
            return Err(EngineError::Forbidden {
                actor: user.id.clone(),
                action: "submit a remote-work request".to_string(),
            });
        }

        let range = DateRange::new(start, end)
            .map_err(|error| EngineError::InvalidInput(error.to_string()))?;

        for date in range {
            self.check_day(user, date, kind, policy, now)?;
        }

        Ok(())
    }

    fn check_day(
        &self,
        user: &User,
        date: NaiveDate,
        kind: RequestKind,
        policy: &RemotePolicy,
        now: DateTime<Utc>,
    ) -> Result<(), PolicyRejection> {
        if dates::is_past_date(date, now) {
            return Err(PolicyRejection { kind: RejectionKind::PastDate, date });
        }

        if !dates::meets_cutoff(date, policy.cutoff_hours_before, now) {
            return Err(PolicyRejection { kind: RejectionKind::CutoffViolation, date });
        }

        if kind == RequestKind::SetRemote && policy.requires_office_on(date.weekday()) {
            return Err(PolicyRejection { kind: RejectionKind::RequiredOfficeDay, date });
        }

        if kind == RequestKind::SetRemote {
            // Each day is checked against the stored calendar only; earlier
            // days of the same request do not count toward later days.
            let (week_start, week_end) = dates::iso_week_bounds(date);
            let week_count = self.calendar.count_remote_between(&user.id, week_start, week_end);
            if week_count + 1 > policy.weekly_limit {
                return Err(PolicyRejection { kind: RejectionKind::WeeklyLimitExceeded, date });
            }

            let (month_start, month_end) = dates::month_bounds(date);
            let month_count = self.calendar.count_remote_between(&user.id, month_start, month_end);
            if month_count + 1 > policy.monthly_limit {
                return Err(PolicyRejection { kind: RejectionKind::MonthlyLimitExceeded, date });
            }
        }

        Ok(())
    }
}
