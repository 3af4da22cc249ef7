//! Event types for parsed calendars.
//!
//! This module provides the per-event records produced by the parser:
//! - [`Event`]: one scheduled occurrence, either a literal event or one
//!   materialized instance of a recurring series
//! - [`Attendee`]: a participant or organizer of an event

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::time::{is_midnight, zero_instant};

/// A participant or organizer of an event.
///
/// Every field is the raw parameter value from the source document, or an
/// empty string when the parameter is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attendee {
    /// Email address (the `mailto:` target).
    pub email: String,
    /// Display name (`CN`).
    pub name: String,
    /// Participation role (`ROLE`), e.g. `REQ-PARTICIPANT`.
    pub role: String,
    /// Participation status (`PARTSTAT`), e.g. `ACCEPTED`.
    pub status: String,
    /// Calendar user type (`CUTYPE`), e.g. `INDIVIDUAL`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Attendee {
    /// Creates an attendee with the given email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Builder method to set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns true if neither email nor name is set.
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.name.is_empty()
    }
}

/// One scheduled occurrence of a calendar event.
///
/// Start and end are absolute instants. `start_zone` and `end_zone` carry the
/// zone the event was authored in; `None` means floating local time, in which
/// case the instant holds the wall time as if it were UTC.
///
/// Equality compares every field except the derived `whole_day` flag.
/// Instants compare as instants, so the same second expressed in two zones is
/// equal. `sequence` participates, which keeps generated occurrences of one
/// series distinct from each other.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Stable identifier (`UID`).
    pub uid: String,
    /// Visibility class (`CLASS`).
    pub class: String,
    /// Revision counter; overwritten with the ordinal on generated occurrences.
    pub sequence: i64,
    /// Status (`STATUS`), e.g. `CONFIRMED`.
    pub status: String,
    /// Summary/title (`SUMMARY`).
    pub summary: String,
    /// Description (`DESCRIPTION`), unescaped text is left as-is.
    pub description: String,
    /// Location (`LOCATION`).
    pub location: String,
    /// Start instant.
    pub start: DateTime<Tz>,
    /// End instant, always `>= start`.
    pub end: DateTime<Tz>,
    /// Zone of the start time, `None` for floating time.
    pub start_zone: Option<Tz>,
    /// Zone of the end time, `None` for floating time.
    pub end_zone: Option<Tz>,
    /// True iff both start and end fall exactly on midnight.
    pub whole_day: bool,
    /// Creation timestamp (`CREATED`).
    pub created: Option<DateTime<Utc>>,
    /// Last modification timestamp (`LAST-MODIFIED`).
    pub modified: Option<DateTime<Utc>>,
    /// Raw recurrence rule (`RRULE`), empty for non-recurring events.
    pub rrule: String,
    /// Excluded occurrence instants (`EXDATE`).
    pub exdates: Vec<DateTime<Tz>>,
    /// Set only on an explicit override of one occurrence of a series.
    pub recurrence_id: Option<DateTime<Tz>>,
    /// Participants.
    pub attendees: Vec<Attendee>,
    /// Organizer; empty when absent.
    pub organizer: Attendee,
}

impl Default for Event {
    fn default() -> Self {
        let zero = zero_instant();
        Self {
            uid: String::new(),
            class: String::new(),
            sequence: 0,
            status: String::new(),
            summary: String::new(),
            description: String::new(),
            location: String::new(),
            start: zero,
            end: zero,
            start_zone: None,
            end_zone: None,
            whole_day: true,
            created: None,
            modified: None,
            rrule: String::new(),
            exdates: Vec::new(),
            recurrence_id: None,
            attendees: Vec::new(),
            organizer: Attendee::default(),
        }
    }
}

impl Event {
    /// Creates an event with the given identifier and time span.
    pub fn new(uid: impl Into<String>, start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        let mut event = Self {
            uid: uid.into(),
            start,
            end,
            ..Self::default()
        };
        event.refresh_whole_day();
        event
    }

    /// Recomputes the derived `whole_day` flag from start and end.
    pub fn refresh_whole_day(&mut self) {
        self.whole_day = is_midnight(&self.start) && is_midnight(&self.end);
    }

    /// Returns the event duration.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Returns true if the event carries a recurrence rule.
    pub fn is_recurring(&self) -> bool {
        !self.rrule.is_empty()
    }

    /// Returns true if this event overrides one occurrence of a series.
    pub fn is_override(&self) -> bool {
        self.recurrence_id.is_some()
    }

    /// Returns true if `instant` is listed in the exclusions.
    pub fn is_excluded(&self, instant: &DateTime<Tz>) -> bool {
        self.exdates.iter().any(|ex| ex == instant)
    }

    /// Materializes one occurrence of this event.
    ///
    /// The clone keeps every field except `start`, `end` and `sequence`; the
    /// duration of the base event is preserved and `whole_day` is recomputed.
    pub fn occurrence(&self, start: DateTime<Tz>, sequence: i64) -> Self {
        let mut occurrence = self.clone();
        occurrence.end = start + self.duration();
        occurrence.start = start;
        occurrence.sequence = sequence;
        occurrence.refresh_whole_day();
        occurrence
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Builder method to set the recurrence rule.
    pub fn with_rrule(mut self, rrule: impl Into<String>) -> Self {
        self.rrule = rrule.into();
        self
    }

    /// Builder method to set the sequence number.
    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Builder method to add an excluded instant.
    pub fn with_exdate(mut self, instant: DateTime<Tz>) -> Self {
        self.exdates.push(instant);
        self
    }

    /// Builder method to mark this event as an override of `instant`.
    pub fn with_recurrence_id(mut self, instant: DateTime<Tz>) -> Self {
        self.recurrence_id = Some(instant);
        self
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
            && self.class == other.class
            && self.sequence == other.sequence
            && self.status == other.status
            && self.summary == other.summary
            && self.description == other.description
            && self.location == other.location
            && self.start == other.start
            && self.end == other.end
            && self.start_zone == other.start_zone
            && self.end_zone == other.end_zone
            && self.created == other.created
            && self.modified == other.modified
            && self.rrule == other.rrule
            && self.exdates == other.exdates
            && self.recurrence_id == other.recurrence_id
            && self.attendees == other.attendees
            && self.organizer == other.organizer
    }
}

impl Eq for Event {}
