//! Event block parsing.

use calfeed_core::{Event, end_of_day};
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

use crate::attendee::{parse_attendees, parse_organizer};
use crate::content::{Block, extract_field};
use crate::datetime::{parse_exdates, parse_timestamp, parse_utc_stamp};
use crate::error::ParseResult;
use crate::options::Reporter;
use crate::timezone::Resolution;

/// Settings shared by every block of one calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventContext {
    /// Zone for events that specify none (`X-WR-TIMEZONE`).
    pub default_zone: Option<Tz>,
    /// Convert start, end, exclusions and recurrence id to UTC.
    pub normalize_to_utc: bool,
}

/// Builds one [`Event`] from an event block.
///
/// Zone resolution problems on DTSTART, DTEND, EXDATE or RECURRENCE-ID are
/// sent to `reporter`; the parse continues with UTC unless the handler
/// escalates.
///
/// # Errors
///
/// Returns an error if a timestamp is malformed or a diagnostic is escalated.
pub fn parse_event(
    block: &Block,
    ctx: EventContext,
    reporter: &mut Reporter<'_>,
) -> ParseResult<Event> {
    let start = parse_timestamp("DTSTART", block)?;
    let end = parse_timestamp("DTEND", block)?;
    let recurrence_id = parse_timestamp("RECURRENCE-ID", block)?;

    for (_, resolution) in [&start, &end, &recurrence_id].into_iter().flatten() {
        surface(resolution, reporter)?;
    }

    let mut event = Event {
        uid: extract_field("UID", block),
        class: extract_field("CLASS", block),
        sequence: extract_field("SEQUENCE", block).parse().unwrap_or(0),
        status: extract_field("STATUS", block),
        summary: extract_field("SUMMARY", block),
        description: extract_field("DESCRIPTION", block),
        location: extract_field("LOCATION", block),
        created: parse_utc_stamp(&extract_field("CREATED", block)),
        modified: parse_utc_stamp(&extract_field("LAST-MODIFIED", block)),
        rrule: extract_field("RRULE", block),
        attendees: parse_attendees(block),
        organizer: parse_organizer(block),
        ..Event::default()
    };

    if let Some((stamp, _)) = &start {
        event.start = stamp.instant(ctx.default_zone);
        event.start_zone = stamp.zone().or(ctx.default_zone);
    } else {
        event.start_zone = ctx.default_zone;
    }

    match &end {
        Some((stamp, _)) => {
            event.end = stamp.instant(ctx.default_zone);
            event.end_zone = stamp.zone().or(ctx.default_zone);
        }
        None => {
            event.end = end_of_day(&event.start);
            event.end_zone = event.start_zone;
        }
    }

    if event.end < event.start {
        debug!(uid = %event.uid, "end before start, clamping to start");
        event.end = event.start;
    }

    for line in block.all("EXDATE") {
        let (stamps, resolution) = parse_exdates(line);
        surface(&resolution, reporter)?;
        event
            .exdates
            .extend(stamps.iter().map(|stamp| stamp.instant(ctx.default_zone)));
    }

    event.recurrence_id = recurrence_id.map(|(stamp, _)| stamp.instant(ctx.default_zone));

    if ctx.normalize_to_utc {
        normalize(&mut event);
    }
    event.refresh_whole_day();

    Ok(event)
}

fn surface(resolution: &Resolution, reporter: &mut Reporter<'_>) -> ParseResult<()> {
    match resolution.to_diagnostic(reporter.source()) {
        Some(diagnostic) => reporter.report(diagnostic),
        None => Ok(()),
    }
}

fn to_utc(instant: DateTime<Tz>) -> DateTime<Tz> {
    instant.with_timezone(&Tz::UTC)
}

fn normalize(event: &mut Event) {
    event.start = to_utc(event.start);
    event.end = to_utc(event.end);
    event.exdates = event.exdates.iter().copied().map(to_utc).collect();
    event.recurrence_id = event.recurrence_id.map(to_utc);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::options::{DiagnosticAction, ParseOptions};
    use calfeed_core::{Diagnostic, is_midnight};
    use chrono::{TimeZone, Timelike, Utc};

    const WEEKLY_MEETING: &str = "BEGIN:VEVENT\r\n\
        DTSTART;TZID=Europe/Madrid:20140616T060000\r\n\
        DTEND;TZID=Europe/Madrid:20140616T070000\r\n\
        DTSTAMP:20141125T074253Z\r\n\
        ORGANIZER;CN=Boss:mailto:boss@example.com\r\n\
        UID:1mlc9s3rncb6f7vbss8ht0dr44@google.com\r\n\
        ATTENDEE;CUTYPE=INDIVIDUAL;ROLE=REQ-PARTICIPANT;PARTSTAT=ACCEPTED;CN=Ana:mailto:ana@example.com\r\n\
        CLASS:PRIVATE\r\n\
        CREATED:20140515T075711Z\r\n\
        DESCRIPTION:1. Report on previous weekly tasks. \\n2. Plan of the present weekly tasks.\r\n\
        LAST-MODIFIED:20141125T074253Z\r\n\
        LOCATION:In The Office\r\n\
        SEQUENCE:1\r\n\
        STATUS:CONFIRMED\r\n\
        SUMMARY:General Operative Meeting\r\n\
        TRANSP:OPAQUE\r\n\
        END:VEVENT\r\n";

    const WHOLE_DAY: &str = "BEGIN:VEVENT\n\
        DTSTART;VALUE=DATE:20160122\n\
        DTEND;VALUE=DATE:20160123\n\
        UID:egrkjitavemob4vr9ce8bhh8mk@google.com\n\
        DESCRIPTION:\n\
        SUMMARY:TEST EVENT\n\
        BEGIN:VALARM\n\
        ACTION:EMAIL\n\
        DESCRIPTION:This is an event reminder\n\
        SUMMARY:Alarm notification\n\
        END:VALARM\n\
        END:VEVENT\n";

    fn parse(text: &str, ctx: EventContext) -> ParseResult<Event> {
        let options = ParseOptions::new("test.ics");
        let mut reporter = Reporter::new(&options);
        parse_event(&Block::parse(text), ctx, &mut reporter)
    }

    fn madrid(y: i32, m: u32, d: u32, h: u32) -> DateTime<Tz> {
        Tz::Europe__Madrid.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    mod fields {
        use super::*;

        #[test]
        fn all_fields() {
            let event = parse(WEEKLY_MEETING, EventContext::default()).unwrap();
            assert_eq!(event.uid, "1mlc9s3rncb6f7vbss8ht0dr44@google.com");
            assert_eq!(event.class, "PRIVATE");
            assert_eq!(event.sequence, 1);
            assert_eq!(event.status, "CONFIRMED");
            assert_eq!(event.summary, "General Operative Meeting");
            assert_eq!(
                event.description,
                "1. Report on previous weekly tasks. \\n2. Plan of the present weekly tasks."
            );
            assert_eq!(event.location, "In The Office");
            assert_eq!(event.start, madrid(2014, 6, 16, 6));
            assert_eq!(event.end, madrid(2014, 6, 16, 7));
            assert_eq!(event.start_zone, Some(Tz::Europe__Madrid));
            assert_eq!(
                event.created,
                Some(Utc.with_ymd_and_hms(2014, 5, 15, 7, 57, 11).unwrap())
            );
            assert_eq!(
                event.modified,
                Some(Utc.with_ymd_and_hms(2014, 11, 25, 7, 42, 53).unwrap())
            );
            assert_eq!(event.rrule, "");
            assert_eq!(event.attendees.len(), 1);
            assert_eq!(event.organizer.email, "boss@example.com");
            assert!(!event.whole_day);
            assert!(event.recurrence_id.is_none());
        }

        #[test]
        fn alarm_fields_do_not_leak() {
            let event = parse(WHOLE_DAY, EventContext::default()).unwrap();
            assert_eq!(event.summary, "TEST EVENT");
            assert_eq!(event.description, "");
        }

        #[test]
        fn malformed_sequence_is_zero() {
            let event = parse("BEGIN:VEVENT\nSEQUENCE:abc\nEND:VEVENT\n", EventContext::default())
                .unwrap();
            assert_eq!(event.sequence, 0);
        }
    }

    mod times {
        use super::*;

        #[test]
        fn whole_day() {
            let event = parse(WHOLE_DAY, EventContext::default()).unwrap();
            assert!(event.whole_day);
            assert_eq!(event.start, Tz::UTC.with_ymd_and_hms(2016, 1, 22, 0, 0, 0).unwrap());
            assert!(event.start_zone.is_none());
        }

        #[test]
        fn whole_day_in_default_zone() {
            let ctx = EventContext {
                default_zone: Some(Tz::Europe__Madrid),
                ..EventContext::default()
            };
            let event = parse(WHOLE_DAY, ctx).unwrap();
            assert!(event.whole_day);
            assert_eq!(event.start, madrid(2016, 1, 22, 0));
            assert_eq!(event.start_zone, Some(Tz::Europe__Madrid));
        }

        #[test]
        fn missing_end_is_end_of_start_day() {
            let event = parse(
                "BEGIN:VEVENT\nDTSTART;TZID=Europe/Madrid:20140616T060000\nEND:VEVENT\n",
                EventContext::default(),
            )
            .unwrap();
            assert_eq!(event.end, end_of_day(&madrid(2014, 6, 16, 6)));
            assert_eq!(event.end.hour(), 23);
            assert_eq!(event.end_zone, Some(Tz::Europe__Madrid));
        }

        #[test]
        fn missing_start_is_zero_instant() {
            let event = parse("BEGIN:VEVENT\nUID:x\nEND:VEVENT\n", EventContext::default()).unwrap();
            assert!(calfeed_core::time::is_zero(&event.start));
            assert!(event.end >= event.start);
        }

        #[test]
        fn utc_normalization() {
            let ctx = EventContext {
                normalize_to_utc: true,
                ..EventContext::default()
            };
            let event = parse(WEEKLY_MEETING, ctx).unwrap();
            assert_eq!(event.start.timezone(), Tz::UTC);
            assert_eq!(event.start.hour(), 4);
            assert_eq!(event.start, madrid(2014, 6, 16, 6));
            assert_eq!(event.start_zone, Some(Tz::Europe__Madrid));
        }

        #[test]
        fn normalization_can_clear_whole_day() {
            let ctx = EventContext {
                default_zone: Some(Tz::Europe__Madrid),
                normalize_to_utc: true,
            };
            let event = parse(WHOLE_DAY, ctx).unwrap();
            assert!(!is_midnight(&event.start));
            assert!(!event.whole_day);
        }

        #[test]
        fn malformed_start_is_fatal() {
            let err = parse("BEGIN:VEVENT\nDTSTART:tomorrow\nEND:VEVENT\n", EventContext::default())
                .unwrap_err();
            assert!(matches!(err, ParseError::MalformedTimestamp { .. }));
        }
    }

    mod series {
        use super::*;

        #[test]
        fn exclusions_and_rule() {
            let event = parse(
                "BEGIN:VEVENT\n\
                 DTSTART;TZID=Europe/Madrid:20160711T150000\n\
                 DTEND;TZID=Europe/Madrid:20160711T160000\n\
                 RRULE:FREQ=WEEKLY;BYDAY=MO\n\
                 EXDATE;TZID=Europe/Madrid:20160718T150000,20160725T150000\n\
                 EXDATE:20160801T130000Z\n\
                 END:VEVENT\n",
                EventContext::default(),
            )
            .unwrap();
            assert_eq!(event.rrule, "FREQ=WEEKLY;BYDAY=MO");
            assert_eq!(
                event.exdates,
                vec![madrid(2016, 7, 18, 15), madrid(2016, 7, 25, 15), madrid(2016, 8, 1, 15)]
            );
        }

        #[test]
        fn recurrence_id() {
            let event = parse(
                "BEGIN:VEVENT\n\
                 DTSTART;TZID=Europe/Madrid:20151013T170000\n\
                 RECURRENCE-ID;TZID=Europe/Madrid:20151013T150000\n\
                 END:VEVENT\n",
                EventContext::default(),
            )
            .unwrap();
            assert_eq!(event.recurrence_id, Some(madrid(2015, 10, 13, 15)));
            assert!(event.is_override());
        }
    }

    mod diagnostics {
        use super::*;

        const UNMAPPED: &str = "BEGIN:VEVENT\n\
            DTSTART;TZID=Mars Standard Time:20240101T090000\n\
            DTEND;TZID=Pacific Standard Time 1:20240101T100000\n\
            END:VEVENT\n";

        #[test]
        fn reported_and_collected() {
            let options = ParseOptions::new("mars.ics");
            let mut reporter = Reporter::new(&options);
            let event =
                parse_event(&Block::parse(UNMAPPED), EventContext::default(), &mut reporter).unwrap();

            assert_eq!(event.start_zone, Some(Tz::UTC));
            assert_eq!(event.end_zone, Some(Tz::America__Los_Angeles));
            assert_eq!(
                reporter.into_diagnostics(),
                vec![
                    Diagnostic::unmapped("Mars Standard Time", "mars.ics"),
                    Diagnostic::compatibility(
                        "Pacific Standard Time 1",
                        "Pacific Standard Time",
                        "mars.ics"
                    ),
                ]
            );
        }

        #[test]
        fn escalation_aborts() {
            let options = ParseOptions::new("mars.ics").with_diagnostics(|d| match d {
                Diagnostic::UnmappedTimezone { .. } => DiagnosticAction::Escalate,
                Diagnostic::CompatibilityTimezone { .. } => DiagnosticAction::Continue,
            });
            let mut reporter = Reporter::new(&options);
            let err = parse_event(&Block::parse(UNMAPPED), EventContext::default(), &mut reporter)
                .unwrap_err();
            assert_eq!(
                err,
                ParseError::Escalated(Diagnostic::unmapped("Mars Standard Time", "mars.ics"))
            );
        }
    }
}
