//! Calendar assembly: document splitting, header fields, and the final
//! merge of literal events, generated occurrences and overrides.

use std::collections::{HashMap, HashSet};

use calfeed_core::{Calendar, Event};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::content::{Block, extract_field};
use crate::error::ParseResult;
use crate::event::{EventContext, parse_event};
use crate::expand::expand;
use crate::options::{ParseOptions, Reporter};
use crate::timezone::{Resolution, resolve};

/// A document split into its header and its raw event blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Everything outside event blocks.
    pub header: String,
    /// One entry per `BEGIN:VEVENT` ... `END:VEVENT`, delimiters included.
    pub events: Vec<String>,
}

/// Splits `content` into header and event blocks.
///
/// An unterminated trailing block is left in the header.
pub fn split_document(content: &str) -> Document {
    let mut doc = Document::default();
    let mut current: Option<String> = None;

    for line in content.split_inclusive('\n') {
        let marker = line.trim_end();
        if let Some(block) = current.as_mut() {
            block.push_str(line);
            if marker.eq_ignore_ascii_case("END:VEVENT") {
                doc.events.extend(current.take());
            }
        } else if marker.eq_ignore_ascii_case("BEGIN:VEVENT") {
            current = Some(line.to_string());
        } else {
            doc.header.push_str(line);
        }
    }

    if let Some(unterminated) = current {
        warn!("unterminated VEVENT block ignored");
        doc.header.push_str(&unterminated);
    }

    doc
}

/// Parses a calendar document.
///
/// # Errors
///
/// Returns an error if any event carries a malformed timestamp or a
/// diagnostic is escalated; no partial calendar is returned.
pub fn parse_calendar(content: &str, options: &ParseOptions) -> ParseResult<Calendar> {
    let doc = split_document(content);
    let header = Block::parse(&doc.header);

    let mut calendar = Calendar::new(options.source.clone());
    calendar.name = extract_field("X-WR-CALNAME", &header);
    calendar.description = extract_field("X-WR-CALDESC", &header);
    calendar.version = extract_field("VERSION", &header).parse().unwrap_or(0.0);
    calendar.timezone = default_zone(&extract_field("X-WR-TIMEZONE", &header));
    calendar.utc_normalized = options.normalize_to_utc;

    let ctx = EventContext {
        default_zone: calendar.timezone,
        normalize_to_utc: options.normalize_to_utc,
    };

    let mut reporter = Reporter::new(options);
    let mut events = Vec::new();
    let mut excluded = Vec::new();

    for raw in &doc.events {
        let event = parse_event(&Block::parse(raw), ctx, &mut reporter)?;
        let series = expand(&event, options.max_repeats);
        debug!(
            uid = %event.uid,
            occurrences = series.live.len(),
            excluded = series.excluded.len(),
            "parsed event"
        );
        events.push(event);
        events.extend(series.live);
        excluded.extend(series.excluded);
    }

    calendar.events = reconcile(events, &excluded);
    calendar.diagnostics = reporter.into_diagnostics();

    info!(
        source = %calendar.source,
        blocks = doc.events.len(),
        events = calendar.events.len(),
        diagnostics = calendar.diagnostics.len(),
        "parsed calendar"
    );

    Ok(calendar)
}

fn default_zone(name: &str) -> Option<Tz> {
    if name.is_empty() {
        return None;
    }
    match resolve(name) {
        (_, Resolution::Unmapped { .. }) => {
            warn!(zone = %name, "unknown calendar timezone, events without a zone stay floating");
            None
        }
        (tz, _) => Some(tz),
    }
}

/// Orders, deduplicates and filters the combined event list.
///
/// 1. stable sort by start instant
/// 2. drop non-override events replaced by an override (same UID, start
///    equal to the override's recurrence id)
/// 3. drop events equal to an earlier one
/// 4. drop events equal to an excluded occurrence
pub fn reconcile(mut events: Vec<Event>, excluded: &[Event]) -> Vec<Event> {
    events.sort_by(|a, b| a.start.cmp(&b.start));

    let overridden: HashSet<(String, i64)> = events
        .iter()
        .filter_map(|e| e.recurrence_id.map(|rid| (e.uid.clone(), rid.timestamp())))
        .collect();

    let mut excluded_by_key: HashMap<(&str, i64), Vec<&Event>> = HashMap::new();
    for e in excluded {
        excluded_by_key
            .entry((e.uid.as_str(), e.start.timestamp()))
            .or_default()
            .push(e);
    }

    let mut result: Vec<Event> = Vec::with_capacity(events.len());
    let mut run_start = 0;

    for event in events {
        let key = (event.uid.clone(), event.start.timestamp());
        if !event.is_override() && overridden.contains(&key) {
            debug!(uid = %event.uid, start = %event.start, "occurrence replaced by override");
            continue;
        }

        if result
            .get(run_start)
            .is_some_and(|first| first.start != event.start)
        {
            run_start = result.len();
        }
        if result[run_start..].contains(&event) {
            continue;
        }

        let is_excluded = excluded_by_key
            .get(&(event.uid.as_str(), event.start.timestamp()))
            .is_some_and(|candidates| candidates.iter().any(|ex| **ex == event));
        if is_excluded {
            continue;
        }

        result.push(event);
    }

    result
}
