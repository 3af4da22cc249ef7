//! iCalendar event extraction, timezone resolution and recurrence expansion.
//!
//! This crate turns the text of a calendar document into a
//! [`calfeed_core::Calendar`]:
//!
//! - [`parse_calendar`] - The entry point
//! - [`ParseOptions`] - Source identifier, repeat cap, UTC normalization and
//!   the diagnostic callback
//! - [`resolve`] - Zone name resolution with the legacy Windows table
//! - [`Expansion`] - Step-wise recurrence expansion of one series
//!
//! # Architecture
//!
//! ```text
//!              document text
//!                    │
//!                    ▼ split_document()
//!        ┌───────────┴────────────┐
//!        ▼                        ▼
//!   ┌─────────┐          ┌──────────────────┐
//!   │ header  │          │  VEVENT blocks   │
//!   └────┬────┘          └────────┬─────────┘
//!        │                        │ parse_event()
//!        │                        ▼
//!        │               ┌──────────────────┐     ┌────────────┐
//!        │               │    base Event    │────▶│  expand()  │
//!        │               └────────┬─────────┘     └─────┬──────┘
//!        │                        │      live / excluded│
//!        │                        ▼                     ▼
//!        │               ┌────────────────────────────────────┐
//!        │               │ reconcile(): sort, overrides,      │
//!        │               │ dedupe, subtract exclusions        │
//!        │               └────────────────┬───────────────────┘
//!        ▼                                ▼
//!   ┌──────────────────────────────────────────────┐
//!   │                   Calendar                   │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use calfeed_parser::{DiagnosticAction, ParseOptions, parse_calendar};
//!
//! let options = ParseOptions::new("team.ics")
//!     .with_max_repeats(1000)
//!     .with_diagnostics(|diag| {
//!         eprintln!("{diag}");
//!         DiagnosticAction::Continue
//!     });
//! let calendar = parse_calendar(&content, &options)?;
//! ```

pub mod attendee;
pub mod calendar;
pub mod content;
pub mod datetime;
pub mod error;
pub mod event;
pub mod expand;
pub mod options;
pub mod rrule;
pub mod timezone;

// Re-export main types at crate root
pub use calendar::{Document, parse_calendar, reconcile, split_document};
pub use content::{Block, ContentLine, extract_field};
pub use error::{ParseError, ParseResult};
pub use event::{EventContext, parse_event};
pub use expand::{Expanded, Expansion, expand};
pub use options::{DiagnosticAction, DiagnosticHandler, ParseOptions, Reporter};
pub use rrule::{Frequency, RecurrenceRule};
pub use timezone::{Resolution, resolve};

pub use calfeed_core::{Attendee, Calendar, Diagnostic, Event};
