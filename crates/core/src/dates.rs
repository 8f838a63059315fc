use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

/// Injectable source of "now" so cutoff and past-date checks stay testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a single instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("invalid date range: end {end} precedes start {start}")]
pub struct InvalidRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A lazy, finite, restartable (via `Clone`) sequence of calendar dates from
/// `start` to `end` inclusive, ascending.
#[derive(Clone, Debug)]
pub struct DateRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidRange> {
        if end < start {
            return Err(InvalidRange { start, end });
        }
        Ok(Self { next: Some(start), end })
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        self.next = if current < self.end { current.succ_opt() } else { None };
        Some(current)
    }
}

pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// True when the end of `date` (day boundary) lies strictly before `now`.
pub fn is_past_date(date: NaiveDate, now: DateTime<Utc>) -> bool {
    day_start(date) + Duration::days(1) < now
}

/// True when the start of `date` is at least `cutoff_hours` hours after
/// `now`. A zero (or negative) cutoff admits any present or future day; past
/// days never pass.
pub fn meets_cutoff(date: NaiveDate, cutoff_hours: i64, now: DateTime<Utc>) -> bool {
    if is_past_date(date, now) {
        return false;
    }
    if cutoff_hours <= 0 {
        return true;
    }
    day_start(date) - now >= Duration::hours(cutoff_hours)
}

/// Inclusive first and last day of the ISO week (Monday through Sunday)
/// containing `date`.
pub fn iso_week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// Inclusive first and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = match first.checked_add_months(Months::new(1)) {
        Some(next_month) => next_month - Duration::days(1),
        None => NaiveDate::MAX,
    };
    (first, last)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, TimeZone, Utc, Weekday};

    use super::{
        is_past_date, iso_week_bounds, meets_cutoff, month_bounds, DateRange, InvalidRange,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn range_yields_every_day_inclusive_and_ascending() {
        let range =
            DateRange::new(date(2026, 8, 30), date(2026, 9, 2)).expect("well-formed range");
        let days: Vec<NaiveDate> = range.collect();

        assert_eq!(
            days,
            vec![date(2026, 8, 30), date(2026, 8, 31), date(2026, 9, 1), date(2026, 9, 2)]
        );
    }

    #[test]
    fn single_day_range_yields_one_day() {
        let days: Vec<NaiveDate> =
            DateRange::new(date(2026, 9, 1), date(2026, 9, 1)).expect("valid").collect();
        assert_eq!(days, vec![date(2026, 9, 1)]);
    }

    #[test]
    fn range_is_restartable_via_clone() {
        let range = DateRange::new(date(2026, 9, 1), date(2026, 9, 3)).expect("valid");
        let first: Vec<NaiveDate> = range.clone().collect();
        let second: Vec<NaiveDate> = range.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let error = DateRange::new(date(2026, 9, 2), date(2026, 9, 1)).expect_err("inverted");
        assert_eq!(error, InvalidRange { start: date(2026, 9, 2), end: date(2026, 9, 1) });
    }

    #[test]
    fn past_date_is_relative_to_the_day_boundary() {
        let noon = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();

        assert!(is_past_date(date(2026, 8, 30), noon));
        // The current day is not past until its boundary has elapsed.
        assert!(!is_past_date(date(2026, 9, 1), noon));
        assert!(!is_past_date(date(2026, 9, 2), noon));
    }

    #[test]
    fn cutoff_compares_against_the_start_of_the_day() {
        let now = Utc.with_ymd_and_hms(2026, 9, 1, 6, 0, 0).unwrap();

        // Start of 2026-09-02 is 18h away.
        assert!(meets_cutoff(date(2026, 9, 2), 18, now));
        assert!(!meets_cutoff(date(2026, 9, 2), 20, now));
        assert!(!meets_cutoff(date(2026, 8, 30), 0, now));
    }

    #[test]
    fn zero_cutoff_admits_present_and_future_days() {
        let noon = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();

        assert!(meets_cutoff(date(2026, 9, 1), 0, noon));
        assert!(meets_cutoff(date(2026, 9, 30), 0, noon));
    }

    #[test]
    fn iso_week_runs_monday_through_sunday() {
        // 2026-09-03 is a Thursday.
        let day = date(2026, 9, 3);
        assert_eq!(day.weekday(), Weekday::Thu);

        let (start, end) = iso_week_bounds(day);
        assert_eq!(start, date(2026, 8, 31));
        assert_eq!(start.weekday(), Weekday::Mon);
        assert_eq!(end, date(2026, 9, 6));
        assert_eq!(end.weekday(), Weekday::Sun);

        // A Monday is its own week start.
        assert_eq!(iso_week_bounds(date(2026, 8, 31)).0, date(2026, 8, 31));
    }

    #[test]
    fn month_bounds_are_inclusive() {
        assert_eq!(month_bounds(date(2026, 2, 14)), (date(2026, 2, 1), date(2026, 2, 28)));
        assert_eq!(month_bounds(date(2028, 2, 14)), (date(2028, 2, 1), date(2028, 2, 29)));
        assert_eq!(month_bounds(date(2026, 12, 31)), (date(2026, 12, 1), date(2026, 12, 31)));
    }
}
