use chrono::{DateTime, Utc};

use crate::dates::DateRange;
use crate::domain::calendar::{CalendarDay, DayStatus, EntrySource};
use crate::domain::request::RemoteRequest;
use crate::store::CalendarStore;

/// One calendar write performed by a projection, with the entry it replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarMutation {
    pub before: Option<CalendarDay>,
    pub after: CalendarDay,
}

/// Projects an approved remote request onto the calendar: one REMOTE entry per
/// day of the inclusive range, provenance `ApprovedRequest`. Existing entries
/// are updated, missing ones created. Idempotent over the same request.
///
/// Returns the mutations in date order so the caller can audit each one.
pub fn project(
    request: &RemoteRequest,
    calendar: &mut dyn CalendarStore,
    now: DateTime<Utc>,
) -> Vec<CalendarMutation> {
    // The range was validated at submission; a decided request always holds
    // start <= end.
    let Ok(range) = DateRange::new(request.start_date, request.end_date) else {
        return Vec::new();
    };

    let mut mutations = Vec::new();
    for date in range {
        let before = calendar.get(&request.user_id, date);
        let after = CalendarDay {
            user_id: request.user_id.clone(),
            date,
            status: DayStatus::Remote,
            source: EntrySource::ApprovedRequest,
            last_changed_at: now,
        };
        calendar.upsert(after.clone());
        mutations.push(CalendarMutation { before, after });
    }

    mutations
}
