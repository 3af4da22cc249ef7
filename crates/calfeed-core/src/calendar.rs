//! The parsed calendar aggregate.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::diagnostic::Diagnostic;
use crate::event::Event;

/// A parsed calendar: header metadata plus every materialized event.
///
/// Built once per parse call and read-only afterwards. `events` is sorted by
/// start instant, ties keeping emission order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Calendar {
    /// Calendar name (`X-WR-CALNAME`).
    pub name: String,
    /// Calendar description (`X-WR-CALDESC`).
    pub description: String,
    /// Declared format version (`VERSION`), `0.0` when absent or malformed.
    pub version: f64,
    /// Default zone for events that specify none (`X-WR-TIMEZONE`).
    pub timezone: Option<Tz>,
    /// Where the document came from (path or URL).
    pub source: String,
    /// Events and materialized occurrences, start-time ascending.
    pub events: Vec<Event>,
    /// Whether every event instant was normalized to UTC.
    pub utc_normalized: bool,
    /// Non-fatal conditions, in the order they were reported.
    pub diagnostics: Vec<Diagnostic>,
}

impl Calendar {
    /// Creates an empty calendar for the given source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the calendar holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns every event (base, occurrence or override) with the given UID.
    pub fn series(&self, uid: &str) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.uid == uid)
    }

    /// Returns events starting within `[from, to)`.
    pub fn starting_between(
        &self,
        from: DateTime<Tz>,
        to: DateTime<Tz>,
    ) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(move |e| e.start >= from && e.start < to)
    }
}
