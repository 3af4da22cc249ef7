//! Non-fatal conditions reported while parsing a calendar.

use serde::Serialize;
use thiserror::Error;

/// A non-fatal condition found while parsing.
///
/// Parsing continues with a usable value after each of these; they exist so
/// callers can log, alert, or escalate without the parser hard-coding policy.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A zone name matched nothing, not even after suffix stripping.
    #[error("Unmapped timezone location '{location}' for iCal '{calendar}'. Falling back to UTC")]
    UnmappedTimezone {
        /// The offending zone name.
        location: String,
        /// Source identifier of the calendar.
        calendar: String,
    },

    /// A zone name resolved only after stripping a trailing disambiguator.
    #[error("Compatibility mode used, '{original} mapped to {matched}' for iCal '{calendar}'")]
    CompatibilityTimezone {
        /// The zone name as written in the document.
        original: String,
        /// The trimmed name that matched the legacy table.
        matched: String,
        /// Source identifier of the calendar.
        calendar: String,
    },
}

impl Diagnostic {
    /// Creates an unmapped timezone diagnostic.
    pub fn unmapped(location: impl Into<String>, calendar: impl Into<String>) -> Self {
        Self::UnmappedTimezone {
            location: location.into(),
            calendar: calendar.into(),
        }
    }

    /// Creates a compatibility-mapped timezone diagnostic.
    pub fn compatibility(
        original: impl Into<String>,
        matched: impl Into<String>,
        calendar: impl Into<String>,
    ) -> Self {
        Self::CompatibilityTimezone {
            original: original.into(),
            matched: matched.into(),
            calendar: calendar.into(),
        }
    }

    /// Returns the source identifier of the calendar this was reported for.
    pub fn calendar(&self) -> &str {
        match self {
            Self::UnmappedTimezone { calendar, .. } | Self::CompatibilityTimezone { calendar, .. } => {
                calendar
            }
        }
    }
}
