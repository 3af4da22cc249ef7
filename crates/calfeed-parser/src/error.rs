//! Error types for calendar parsing.
//!
//! Parsing is lenient: absent or malformed text fields become empty values and
//! unresolvable zones fall back to UTC with a [`Diagnostic`]. Only the
//! conditions below abort a parse.

use calfeed_core::Diagnostic;
use thiserror::Error;

/// An error that aborted parsing of a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A DTSTART/DTEND/RECURRENCE-ID value did not match the expected layout.
    #[error("malformed {tag} value '{value}'")]
    MalformedTimestamp {
        /// Property name the value belonged to.
        tag: String,
        /// The raw value.
        value: String,
    },

    /// The diagnostic callback asked for a diagnostic to be treated as fatal.
    #[error("escalated: {0}")]
    Escalated(Diagnostic),
}

impl ParseError {
    /// Creates a malformed timestamp error.
    pub fn malformed(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            tag: tag.into(),
            value: value.into(),
        }
    }

    /// Returns the escalated diagnostic, if this error is one.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Escalated(diag) => Some(diag),
            Self::MalformedTimestamp { .. } => None,
        }
    }
}

/// A specialized Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;
