//! Recurrence expansion.
//!
//! [`Expansion`] walks a recurring event period by period. Each period starts
//! at a cursor that begins at the event start and advances by the rule's
//! step. Within a period:
//! - periods outside `BYMONTH` emit nothing
//! - with `BYDAY`, the seven days from the cursor are scanned and each
//!   matching weekday is emitted
//! - otherwise the cursor itself is emitted
//!
//! The base event's own start is never emitted again. Every emission consumes
//! one unit of `COUNT` and takes the next ordinal, whether it ends up live or
//! excluded. Expansion stops when the count is used up, when more than the
//! repeat cap has been emitted, when the cursor passes `UNTIL`, or after
//! [`MAX_IDLE_PERIODS`] consecutive periods without an emission. The cap
//! check is strict, so a `COUNT` above the cap yields cap + 1 occurrences.

use calfeed_core::{Event, add_date};
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::rrule::RecurrenceRule;

/// Consecutive empty periods after which a series is considered exhausted.
pub const MAX_IDLE_PERIODS: usize = 366;

/// Days scanned per period when `BYDAY` is set.
const WEEK: usize = 7;

/// Occurrences produced by expanding one series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expanded {
    /// Occurrences to add to the calendar.
    pub live: Vec<Event>,
    /// Occurrences matching an `EXDATE`; subtracted from the final calendar.
    pub excluded: Vec<Event>,
}

/// Expansion state for one recurring event.
#[derive(Debug)]
pub struct Expansion<'a> {
    base: &'a Event,
    rule: RecurrenceRule,
    step: (i32, i32, i64),
    cap: usize,
    cursor: DateTime<Tz>,
    emitted: usize,
    remaining: usize,
    idle_periods: usize,
    done: bool,
    out: Expanded,
}

impl<'a> Expansion<'a> {
    /// Prepares expansion of `base`.
    ///
    /// Returns `None` if the event does not recur, the cap is 0, or the rule
    /// has no supported frequency.
    pub fn new(base: &'a Event, max_repeats: usize) -> Option<Self> {
        if max_repeats == 0 || !base.is_recurring() {
            return None;
        }

        let rule = RecurrenceRule::parse(&base.rrule, max_repeats);
        let Some(step) = rule.step() else {
            debug!(uid = %base.uid, rrule = %base.rrule, "unsupported recurrence frequency, not expanding");
            return None;
        };
        if let Some(frequency) = rule.frequency {
            trace!(uid = %base.uid, %frequency, count = rule.count, "expanding series");
        }

        Some(Self {
            base,
            remaining: rule.count,
            rule,
            step,
            cap: max_repeats,
            cursor: base.start,
            emitted: 0,
            idle_periods: 0,
            done: false,
            out: Expanded::default(),
        })
    }

    /// Processes one period. Returns false once expansion is finished.
    pub fn step(&mut self) -> bool {
        if self.is_done() {
            return false;
        }

        let before = self.emitted;
        let period = self.cursor;

        if self.rule.allows_month(period.month()) {
            if self.rule.by_day.is_empty() {
                if period != self.base.start {
                    self.emit(period);
                }
            } else {
                let mut day = period;
                for _ in 0..WEEK {
                    if self.remaining == 0 {
                        break;
                    }
                    if self.rule.allows_weekday(day.weekday()) && day != self.base.start {
                        self.emit(day);
                    }
                    match add_date(&day, 0, 0, 1) {
                        Some(next) => day = next,
                        None => break,
                    }
                }
            }
        }

        if self.emitted == before {
            self.idle_periods += 1;
        } else {
            self.idle_periods = 0;
        }

        let (years, months, days) = self.step;
        match add_date(&self.cursor, years, months, days) {
            Some(next) => self.cursor = next,
            None => self.done = true,
        }

        if self.emitted > self.cap || self.remaining == 0 {
            self.done = true;
        } else if self
            .rule
            .until
            .is_some_and(|until| until <= self.cursor.with_timezone(&Utc))
        {
            self.done = true;
        } else if self.idle_periods >= MAX_IDLE_PERIODS {
            debug!(uid = %self.base.uid, rrule = %self.base.rrule, "no occurrences in {MAX_IDLE_PERIODS} periods, stopping");
            self.done = true;
        }

        !self.done
    }

    /// Runs to completion.
    pub fn run(mut self) -> Expanded {
        while self.step() {}
        trace!(
            uid = %self.base.uid,
            emitted = self.emitted(),
            remaining = self.remaining(),
            live = self.out.live.len(),
            excluded = self.out.excluded.len(),
            "expanded series"
        );
        self.out
    }

    /// Returns the number of occurrences emitted so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Returns how many occurrences `COUNT` still allows.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Returns true once expansion has stopped.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn emit(&mut self, start: DateTime<Tz>) {
        self.emitted += 1;
        self.remaining = self.remaining.saturating_sub(1);

        let ordinal = i64::try_from(self.emitted).unwrap_or(i64::MAX);
        let occurrence = self.base.occurrence(start, ordinal);

        if self.base.is_excluded(&start) {
            self.out.excluded.push(occurrence);
            return;
        }

        match self.rule.until {
            Some(until) if start.with_timezone(&Utc) > until => {
                trace!(uid = %self.base.uid, %start, "occurrence after UNTIL dropped");
            }
            _ => self.out.live.push(occurrence),
        }
    }
}

/// Expands `base` into its generated occurrences.
///
/// The base event itself is not part of the result.
pub fn expand(base: &Event, max_repeats: usize) -> Expanded {
    Expansion::new(base, max_repeats)
        .map(Expansion::run)
        .unwrap_or_default()
}
