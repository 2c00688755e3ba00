use chrono::{DateTime, NaiveDate, Utc};

/// Milliseconds in a 365.25-day year.
const MS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0 * 1000.0;

/// Year fraction between two instants, clamped at zero.
/// A maturity on or before the valuation instant yields exactly 0.
#[inline]
pub fn years_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let ms = (end - start).num_milliseconds().max(0);
    ms as f64 / MS_PER_YEAR
}

/// Year fraction between two calendar dates, both taken at midnight UTC
/// so the result does not depend on the local timezone or DST.
#[inline]
pub fn years_between_dates(start: NaiveDate, end: NaiveDate) -> f64 {
    years_between(midnight_utc(start), midnight_utc(end))
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
