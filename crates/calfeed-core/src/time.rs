//! Calendar arithmetic on zoned instants.
//!
//! All instants in the model are [`DateTime<Tz>`]. Floating (zone-less) wall
//! times are carried as UTC-equivalent instants, so every helper here works on
//! the local wall clock of whatever zone the instant is expressed in:
//! - [`localize`] turns a wall time into an instant, never failing on DST gaps
//!   or folds
//! - [`add_date`] advances by years/months/days with overflow normalization
//! - [`end_of_day`] gives 23:59:59 of the instant's local day

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone,
    Timelike, Weekday,
};
use chrono_tz::Tz;

/// Returns the zero instant (0001-01-01T00:00:00 UTC).
///
/// Used where a required instant is absent from the source document.
pub fn zero_instant() -> DateTime<Tz> {
    let naive = NaiveDate::from_ymd_opt(1, 1, 1)
        .expect("valid date")
        .and_time(NaiveTime::MIN);
    Tz::UTC.from_utc_datetime(&naive)
}

/// Returns true if `dt` is the zero instant.
pub fn is_zero(dt: &DateTime<Tz>) -> bool {
    *dt == zero_instant()
}

/// Interprets a wall-clock time in `tz`.
///
/// Folds resolve to the earlier instant. Wall times inside a DST gap are
/// shifted using the offset in force before the gap, so 02:30 on a spring
/// forward night in New York becomes 03:30 EDT.
pub fn localize(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt;
    }

    let before = tz
        .offset_from_utc_datetime(&(naive - TimeDelta::days(1)))
        .fix()
        .local_minus_utc();
    tz.from_utc_datetime(&(naive - TimeDelta::seconds(i64::from(before))))
}

/// Returns 23:59:59 of the local day of `dt`, in the same zone.
pub fn end_of_day(dt: &DateTime<Tz>) -> DateTime<Tz> {
    let time = NaiveTime::from_hms_opt(23, 59, 59).expect("valid time");
    localize(dt.timezone(), dt.date_naive().and_time(time))
}

/// Returns true if the local wall time of `dt` is exactly midnight.
pub fn is_midnight(dt: &DateTime<Tz>) -> bool {
    dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0
}

/// Adds years, months and days to the local wall clock of `dt`.
///
/// Out-of-range days roll into the following month instead of clamping:
/// January 31st plus one month is March 3rd (March 2nd in a leap year), and
/// February 29th plus one year is March 1st. Returns `None` only when the
/// result leaves the representable range.
pub fn add_date(dt: &DateTime<Tz>, years: i32, months: i32, days: i64) -> Option<DateTime<Tz>> {
    let local = dt.naive_local();

    let total_months = i64::from(local.year()) * 12
        + i64::from(local.month0())
        + i64::from(years) * 12
        + i64::from(months);
    let year = i32::try_from(total_months.div_euclid(12)).ok()?;
    let month = u32::try_from(total_months.rem_euclid(12)).ok()? + 1;

    let date = NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_signed(TimeDelta::try_days(i64::from(local.day()) - 1 + days)?)?;

    Some(localize(dt.timezone(), date.and_time(local.time())))
}

/// Returns the two-letter iCalendar code for a weekday (`MO`, `TU`, ...).
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
