//! `ATTENDEE` and `ORGANIZER` properties.

use calfeed_core::Attendee;

use crate::content::{Block, ContentLine};

/// Builds an attendee from one `ATTENDEE` line.
///
/// The email is whatever follows `mailto:` in the value; parameters that are
/// absent become empty strings.
pub fn parse_attendee(line: &ContentLine) -> Attendee {
    Attendee {
        email: mail_target(&line.value),
        name: param(line, "CN"),
        role: param(line, "ROLE"),
        status: param(line, "PARTSTAT"),
        kind: param(line, "CUTYPE"),
    }
}

/// Returns every attendee of `block`, dropping entries with neither an email
/// nor a name.
pub fn parse_attendees(block: &Block) -> Vec<Attendee> {
    block
        .all("ATTENDEE")
        .map(parse_attendee)
        .filter(|attendee| !attendee.is_empty())
        .collect()
}

/// Returns the organizer of `block`, or an empty attendee.
///
/// Only the email and display name are kept.
pub fn parse_organizer(block: &Block) -> Attendee {
    block
        .first("ORGANIZER")
        .map(|line| Attendee::new(mail_target(&line.value)).with_name(param(line, "CN")))
        .unwrap_or_default()
}

fn param(line: &ContentLine, key: &str) -> String {
    line.param(key).unwrap_or_default().to_string()
}

fn mail_target(value: &str) -> String {
    let lower = value.to_ascii_lowercase();
    match lower.find("mailto:") {
        Some(idx) => value[idx + "mailto:".len()..].trim().to_string(),
        None => String::new(),
    }
}
