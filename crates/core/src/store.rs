use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::calendar::{CalendarDay, DayStatus};
use crate::domain::request::{RemoteRequest, RequestId, RequestStatus};
use crate::domain::user::{User, UserId};

/// Keyed calendar state: at most one entry per (user, date). Implementations
/// only need keyed lookup, upsert, and inclusive range scans.
pub trait CalendarStore {
    fn get(&self, user: &UserId, date: NaiveDate) -> Option<CalendarDay>;
    fn upsert(&mut self, day: CalendarDay);
    fn days_for_user(&self, user: &UserId) -> Vec<CalendarDay>;
    /// Number of REMOTE entries for `user` with `from <= date <= to`.
    fn count_remote_between(&self, user: &UserId, from: NaiveDate, to: NaiveDate) -> u32;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryCalendarStore {
    days: BTreeMap<(UserId, NaiveDate), CalendarDay>,
}

impl InMemoryCalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl CalendarStore for InMemoryCalendarStore {
    fn get(&self, user: &UserId, date: NaiveDate) -> Option<CalendarDay> {
        self.days.get(&(user.clone(), date)).cloned()
    }

    fn upsert(&mut self, day: CalendarDay) {
        self.days.insert((day.user_id.clone(), day.date), day);
    }

    fn days_for_user(&self, user: &UserId) -> Vec<CalendarDay> {
        self.days
            .range((user.clone(), NaiveDate::MIN)..=(user.clone(), NaiveDate::MAX))
            .map(|(_, day)| day.clone())
            .collect()
    }

    fn count_remote_between(&self, user: &UserId, from: NaiveDate, to: NaiveDate) -> u32 {
        if to < from {
            return 0;
        }
        self.days
            .range((user.clone(), from)..=(user.clone(), to))
            .filter(|(_, day)| day.status == DayStatus::Remote)
            .count() as u32
    }
}

/// Request collection: lookup by id, insert, update, and filter scans.
pub trait RequestStore {
    fn get(&self, id: &RequestId) -> Option<RemoteRequest>;
    fn insert(&mut self, request: RemoteRequest);
    fn update(&mut self, request: RemoteRequest);
    fn list_for_user(&self, user: &UserId) -> Vec<RemoteRequest>;
    fn list_by_status(&self, status: RequestStatus) -> Vec<RemoteRequest>;
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryRequestStore {
    requests: BTreeMap<RequestId, RemoteRequest>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestStore for InMemoryRequestStore {
    fn get(&self, id: &RequestId) -> Option<RemoteRequest> {
        self.requests.get(id).cloned()
    }

    fn insert(&mut self, request: RemoteRequest) {
        self.requests.insert(request.id.clone(), request);
    }

    fn update(&mut self, request: RemoteRequest) {
        self.requests.insert(request.id.clone(), request);
    }

    fn list_for_user(&self, user: &UserId) -> Vec<RemoteRequest> {
        self.requests.values().filter(|request| &request.user_id == user).cloned().collect()
    }

    fn list_by_status(&self, status: RequestStatus) -> Vec<RemoteRequest> {
        self.requests.values().filter(|request| request.status == status).cloned().collect()
    }
}

/// Seeded identity lookup. The directory is populated once at startup and
/// read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct UserDirectory {
    users: BTreeMap<UserId, User>,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        let users = users.into_iter().map(|user| (user.id.clone(), user)).collect();
        Self { users }
    }

    pub fn find(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use crate::domain::calendar::{CalendarDay, DayStatus, EntrySource};
    use crate::domain::user::UserId;

    use super::{CalendarStore, InMemoryCalendarStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn day(user: &str, on: NaiveDate, status: DayStatus) -> CalendarDay {
        CalendarDay {
            user_id: UserId(user.to_string()),
            date: on,
            status,
            source: EntrySource::Manual,
            last_changed_at: Utc::now(),
        }
    }

    #[test]
    fn upsert_keeps_one_entry_per_user_and_date() {
        let mut store = InMemoryCalendarStore::new();
        let user = UserId("u-1".to_string());
        store.upsert(day("u-1", date(2026, 9, 1), DayStatus::Office));
        store.upsert(day("u-1", date(2026, 9, 1), DayStatus::Remote));

        assert_eq!(store.len(), 1);
        let stored = store.get(&user, date(2026, 9, 1)).expect("entry exists");
        assert_eq!(stored.status, DayStatus::Remote);
    }

    #[test]
    fn remote_count_is_inclusive_and_scoped_to_the_user() {
        let mut store = InMemoryCalendarStore::new();
        store.upsert(day("u-1", date(2026, 9, 1), DayStatus::Remote));
        store.upsert(day("u-1", date(2026, 9, 3), DayStatus::Remote));
        store.upsert(day("u-1", date(2026, 9, 2), DayStatus::Pto));
        store.upsert(day("u-2", date(2026, 9, 1), DayStatus::Remote));

        let user = UserId("u-1".to_string());
        assert_eq!(store.count_remote_between(&user, date(2026, 9, 1), date(2026, 9, 3)), 2);
        assert_eq!(store.count_remote_between(&user, date(2026, 9, 2), date(2026, 9, 2)), 0);
        assert_eq!(store.count_remote_between(&user, date(2026, 9, 4), date(2026, 9, 1)), 0);
    }
}
