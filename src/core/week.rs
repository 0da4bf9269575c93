use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// Monday of the settlement week containing `instant`, in the club's zone.
pub fn week_start(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    let local = instant.with_timezone(&tz).date_naive();
    local - Duration::days(local.weekday().num_days_from_monday() as i64)
}

/// First and last day (inclusive) of the week starting on `start`.
pub fn week_bounds(start: NaiveDate) -> (NaiveDate, NaiveDate) {
    (start, start + Duration::days(6))
}

pub fn is_week_start(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() == 0
}
