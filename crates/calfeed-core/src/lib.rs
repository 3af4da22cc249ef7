//! Core types: calendar, events, attendees, diagnostics, calendar arithmetic,
//! output formatting

pub mod calendar;
pub mod diagnostic;
pub mod event;
pub mod format;
pub mod time;
pub mod tracing;

pub use calendar::Calendar;
pub use diagnostic::Diagnostic;
pub use event::{Attendee, Event};
pub use format::{FormatOptions, OutputFormat, OutputFormatter};
pub use time::{add_date, end_of_day, is_midnight, localize, weekday_code, zero_instant};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};

pub use chrono_tz::Tz;
