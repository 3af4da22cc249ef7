//! Recurrence rule decoding.
//!
//! Only the subset the expander understands is decoded: `FREQ`, `INTERVAL`,
//! `COUNT`, `UNTIL`, `BYMONTH` and `BYDAY`. Other keys are ignored. Decoding
//! never fails; malformed parts fall back to their defaults.

use std::fmt;

use chrono::{DateTime, Utc, Weekday};

use calfeed_core::weekday_code;

use crate::datetime::parse_until;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// How far a recurrence advances per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }

    /// Returns the frequency keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded `RRULE` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// `None` for missing or unsupported frequencies; such rules never expand.
    pub frequency: Option<Frequency>,
    /// Period multiplier, at least 1. Not applied to weekly rules.
    pub interval: u32,
    /// Occurrences to generate; the repeat cap when `COUNT` is absent or 0.
    pub count: usize,
    /// Last permitted occurrence start.
    pub until: Option<DateTime<Utc>>,
    /// Months (1-12) in which occurrences may fall; empty means any.
    pub by_month: Vec<u32>,
    /// Weekdays scanned within each period; empty means the period start only.
    pub by_day: Vec<Weekday>,
}

impl RecurrenceRule {
    /// Decodes `rule`, using `max_repeats` as the default count.
    pub fn parse(rule: &str, max_repeats: usize) -> Self {
        let mut decoded = Self {
            frequency: None,
            interval: 1,
            count: max_repeats,
            until: None,
            by_month: Vec::new(),
            by_day: Vec::new(),
        };

        for part in rule.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_uppercase().as_str() {
                "FREQ" => decoded.frequency = Frequency::parse(value),
                "INTERVAL" => {
                    decoded.interval = value.parse().ok().filter(|&i| i > 0).unwrap_or(1);
                }
                "COUNT" => {
                    decoded.count = value
                        .parse()
                        .ok()
                        .filter(|&c| c > 0)
                        .unwrap_or(max_repeats);
                }
                "UNTIL" => decoded.until = parse_until(value),
                "BYMONTH" => {
                    decoded.by_month = value
                        .split(',')
                        .filter_map(|m| m.trim().parse().ok())
                        .filter(|m| (1..=12).contains(m))
                        .collect();
                }
                "BYDAY" => decoded.by_day = value.split(',').filter_map(parse_weekday).collect(),
                _ => {}
            }
        }

        decoded
    }

    /// Returns the `(years, months, days)` advanced per period.
    pub fn step(&self) -> Option<(i32, i32, i64)> {
        let interval = i32::try_from(self.interval).unwrap_or(i32::MAX);
        match self.frequency? {
            Frequency::Daily => Some((0, 0, i64::from(interval))),
            Frequency::Weekly => Some((0, 0, 7)),
            Frequency::Monthly => Some((0, interval, 0)),
            Frequency::Yearly => Some((interval, 0, 0)),
        }
    }

    /// Returns true if occurrences may fall in `month` (1-12).
    pub fn allows_month(&self, month: u32) -> bool {
        self.by_month.is_empty() || self.by_month.contains(&month)
    }

    /// Returns true if `day` is one of the `BYDAY` weekdays.
    pub fn allows_weekday(&self, day: Weekday) -> bool {
        self.by_day.contains(&day)
    }
}

/// Reads a `BYDAY` token by its last two letters, so `2MO` and `-1FR` name
/// Monday and Friday.
fn parse_weekday(token: &str) -> Option<Weekday> {
    let token = token.trim();
    let code = token.get(token.len().checked_sub(2)?..)?;
    WEEKDAYS
        .into_iter()
        .find(|&day| weekday_code(day).eq_ignore_ascii_case(code))
}
