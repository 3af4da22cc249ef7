//! Date and date-time property values.
//!
//! Values come in four shapes, captured by [`TimestampKind`]:
//!
//! | Written as                                  | Kind       |
//! |---------------------------------------------|------------|
//! | `DTSTART;VALUE=DATE:20160122` or `20160122` | `Date`     |
//! | `DTSTART:20150930T150000`                   | `Floating` |
//! | `DTSTART:20150930T150000Z`                  | `Utc`      |
//! | `DTSTART;TZID=Europe/Madrid:20150930T150000`| `Zoned`    |
//!
//! Dates and floating times have no zone of their own; they are placed in the
//! calendar's default zone when it has one, otherwise kept as UTC-equivalent
//! wall times.

use calfeed_core::localize;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::content::{Block, ContentLine};
use crate::error::{ParseError, ParseResult};
use crate::timezone::{Resolution, resolve};

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// The zone semantics of a parsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    /// Calendar date, midnight wall time.
    Date,
    /// Wall time without zone.
    Floating,
    /// Absolute UTC time (`Z` suffix).
    Utc,
    /// Wall time in the resolved `TZID` zone.
    Zoned(Tz),
}

/// A parsed date or date-time value, not yet placed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// Wall clock as written.
    pub wall: NaiveDateTime,
    /// How `wall` is to be interpreted.
    pub kind: TimestampKind,
}

impl ParsedTimestamp {
    /// Returns the instant, placing zone-less values in `default_zone`.
    pub fn instant(&self, default_zone: Option<Tz>) -> DateTime<Tz> {
        match (self.kind, default_zone) {
            (TimestampKind::Zoned(tz), _) => localize(tz, self.wall),
            (TimestampKind::Utc, _) => Tz::UTC.from_utc_datetime(&self.wall),
            (TimestampKind::Date | TimestampKind::Floating, Some(tz)) => localize(tz, self.wall),
            (TimestampKind::Date | TimestampKind::Floating, None) => {
                Tz::UTC.from_utc_datetime(&self.wall)
            }
        }
    }

    /// Returns the zone the value was written in, `None` for dates and
    /// floating times.
    pub fn zone(&self) -> Option<Tz> {
        match self.kind {
            TimestampKind::Zoned(tz) => Some(tz),
            TimestampKind::Utc => Some(Tz::UTC),
            TimestampKind::Date | TimestampKind::Floating => None,
        }
    }

    /// Returns true for calendar-date values.
    pub fn is_date(&self) -> bool {
        self.kind == TimestampKind::Date
    }
}

/// Parses the first `tag` line of `block`.
///
/// Returns `Ok(None)` when the property is absent.
///
/// # Errors
///
/// Returns [`ParseError::MalformedTimestamp`] if the value cannot be parsed.
pub fn parse_timestamp(
    tag: &str,
    block: &Block,
) -> ParseResult<Option<(ParsedTimestamp, Resolution)>> {
    block.first(tag).map(parse_line).transpose()
}

/// Parses a single-valued date/date-time line.
///
/// # Errors
///
/// Returns [`ParseError::MalformedTimestamp`] if the value cannot be parsed.
pub fn parse_line(line: &ContentLine) -> ParseResult<(ParsedTimestamp, Resolution)> {
    let (zone, resolution) = line_zone(line);
    let stamp = parse_value(line, &line.value, zone)
        .ok_or_else(|| ParseError::malformed(&line.name, &line.value))?;
    Ok((stamp, resolution))
}

/// Parses a comma-separated exclusion line.
///
/// Items that cannot be parsed are skipped.
pub fn parse_exdates(line: &ContentLine) -> (Vec<ParsedTimestamp>, Resolution) {
    let (zone, resolution) = line_zone(line);
    let stamps = line
        .value
        .split(',')
        .filter_map(|item| parse_value(line, item, zone))
        .collect();
    (stamps, resolution)
}

/// Parses a `CREATED`/`LAST-MODIFIED` style UTC stamp.
///
/// A missing `Z` is tolerated; the value is read as UTC either way.
pub fn parse_utc_stamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    let raw = value.strip_suffix(['Z', 'z']).unwrap_or(value);
    let naive = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Parses an `UNTIL` value as an absolute UTC instant.
///
/// Date-only values mean the end of that day.
pub fn parse_until(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if is_date_only(value) {
        let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(23, 59, 59)?));
    }
    parse_utc_stamp(value)
}

fn line_zone(line: &ContentLine) -> (Option<Tz>, Resolution) {
    match line.param("TZID") {
        Some(name) => {
            let (tz, resolution) = resolve(name);
            (Some(tz), resolution)
        }
        None => (None, Resolution::Exact),
    }
}

fn parse_value(line: &ContentLine, value: &str, zone: Option<Tz>) -> Option<ParsedTimestamp> {
    let value = value.trim();

    if line.has_param("VALUE", "DATE") || is_date_only(value) {
        let date = NaiveDate::parse_from_str(value.get(..8)?, DATE_FORMAT).ok()?;
        return Some(ParsedTimestamp {
            wall: date.and_time(NaiveTime::MIN),
            kind: TimestampKind::Date,
        });
    }

    let (raw, utc) = match value.strip_suffix(['Z', 'z']) {
        Some(raw) => (raw, true),
        None => (value, false),
    };
    let wall = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).ok()?;

    let kind = match zone {
        _ if utc => TimestampKind::Utc,
        Some(tz) => TimestampKind::Zoned(tz),
        None => TimestampKind::Floating,
    };

    Some(ParsedTimestamp { wall, kind })
}

fn is_date_only(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}
