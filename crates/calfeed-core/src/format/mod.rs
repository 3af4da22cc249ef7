//! Output formatting for parsed calendars.
//!
//! This module renders a [`Calendar`] for display:
//! - **Table**: one human-readable line per event
//! - **JSON**: the serialized calendar, produced by the caller with `serde_json`
//!
//! # Example
//!
//! ```rust
//! use calfeed_core::Calendar;
//! use calfeed_core::format::{FormatOptions, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(FormatOptions::default());
//! let lines = formatter.format_table(&Calendar::new("empty.ics"));
//! assert_eq!(lines, vec!["No events".to_string()]);
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::calendar::Calendar;
use crate::event::Event;

/// The output format for calendar display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable table, one event per line.
    #[default]
    Table,
    /// Machine-readable JSON.
    Json,
}

/// Configuration options for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Maximum length for event summaries (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Text to show when the calendar has no events.
    pub no_events_text: String,
    /// Whether to append the authored zone to each line.
    pub show_zone: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_title_length: None,
            no_events_text: "No events".to_string(),
            show_zone: true,
        }
    }
}

/// Output formatter for parsed calendars.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    options: FormatOptions,
}

impl OutputFormatter {
    /// Creates a new OutputFormatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Creates a new OutputFormatter with default options.
    pub fn with_defaults() -> Self {
        Self::new(FormatOptions::default())
    }

    /// Formats the calendar header as a single line.
    pub fn format_header(&self, calendar: &Calendar) -> String {
        let name = if calendar.name.is_empty() {
            calendar.source.as_str()
        } else {
            calendar.name.as_str()
        };
        let zone = calendar.timezone.map(|tz| tz.name()).unwrap_or("no default zone");
        format!("{} ({} events, {})", name, calendar.len(), zone)
    }

    /// Formats every event as one table line.
    ///
    /// An empty calendar yields the configured `no_events_text`.
    pub fn format_table(&self, calendar: &Calendar) -> Vec<String> {
        if calendar.is_empty() {
            return vec![self.options.no_events_text.clone()];
        }
        calendar
            .events
            .iter()
            .map(|event| self.format_event(event))
            .collect()
    }

    /// Formats a single event line.
    pub fn format_event(&self, event: &Event) -> String {
        let mut line = format!(
            "{}  #{}  {}",
            format_span(event),
            event.sequence,
            self.format_title(&event.summary)
        );
        if self.options.show_zone {
            let zone = event.start_zone.map(|tz| tz.name()).unwrap_or("floating");
            line.push_str(&format!("  [{}]", zone));
        }
        if event.is_override() {
            line.push_str("  (override)");
        }
        line
    }

    fn format_title<'a>(&self, title: &'a str) -> Cow<'a, str> {
        match self.options.max_title_length {
            Some(max) => ellipsis(title, max),
            None => Cow::Borrowed(title),
        }
    }
}

fn format_span(event: &Event) -> String {
    if event.whole_day {
        let days = event.duration().num_days();
        return if days > 1 {
            format!("{} all day ({} days)", event.start.format("%Y-%m-%d"), days)
        } else {
            format!("{} all day", event.start.format("%Y-%m-%d"))
        };
    }
    if event.start.date_naive() == event.end.date_naive() {
        format!(
            "{} {}-{}",
            event.start.format("%Y-%m-%d"),
            event.start.format("%H:%M"),
            event.end.format("%H:%M")
        )
    } else {
        format!(
            "{} - {}",
            event.start.format("%Y-%m-%d %H:%M"),
            event.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod ellipsis_tests {
        use super::*;

        #[test]
        fn short_string_unchanged() {
            assert_eq!(ellipsis("standup", 10), "standup");
        }

        #[test]
        fn exact_length_unchanged() {
            assert_eq!(ellipsis("standup", 7), "standup");
        }

        #[test]
        fn long_string_truncated() {
            assert_eq!(ellipsis("quarterly planning", 8), "quart...");
        }

        #[test]
        fn zero_length() {
            assert_eq!(ellipsis("standup", 0), "");
        }

        #[test]
        fn counts_characters_not_bytes() {
            assert_eq!(ellipsis("réunion", 7), "réunion");
        }
    }

    mod output_format {
        use super::*;

        #[test]
        fn default_is_table() {
            assert_eq!(OutputFormat::default(), OutputFormat::Table);
        }

        #[test]
        fn serializes_snake_case() {
            let json = serde_json::to_string(&OutputFormat::Json).unwrap();
            assert_eq!(json, "\"json\"");
        }
    }
}
