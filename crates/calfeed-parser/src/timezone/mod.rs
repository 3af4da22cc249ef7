//! Zone name resolution.
//!
//! Resolution is total. A name is tried, in order:
//! 1. as an IANA identifier
//! 2. verbatim against the legacy table (Windows/Outlook display names)
//! 3. against the legacy table after removing every `<whitespace><digit>`
//!    pair, e.g. `"Pacific Standard Time 1"` -> `"Pacific Standard Time"`
//!
//! Steps 1 and 2 are [`Resolution::Exact`]. Step 3 is
//! [`Resolution::Compatibility`]; a total miss yields UTC with
//! [`Resolution::Unmapped`].

pub mod legacy;

use std::sync::LazyLock;

use calfeed_core::Diagnostic;
use chrono_tz::Tz;
use regex::Regex;

static DISAMBIGUATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[0-9]").expect("disambiguator regex should be valid"));

/// How a zone name was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Canonical identifier or verbatim legacy name.
    Exact,
    /// Legacy name matched only after stripping a trailing disambiguator.
    Compatibility {
        /// The name as written.
        original: String,
        /// The stripped name that matched.
        matched: String,
    },
    /// Nothing matched; UTC was substituted.
    Unmapped {
        /// The name as written.
        name: String,
    },
}

impl Resolution {
    /// Returns true for [`Resolution::Exact`].
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact)
    }

    /// Converts a non-exact outcome into a diagnostic for `calendar`.
    pub fn to_diagnostic(&self, calendar: &str) -> Option<Diagnostic> {
        match self {
            Self::Exact => None,
            Self::Compatibility { original, matched } => {
                Some(Diagnostic::compatibility(original, matched, calendar))
            }
            Self::Unmapped { name } => Some(Diagnostic::unmapped(name, calendar)),
        }
    }
}

/// Resolves a zone name, falling back to UTC.
pub fn resolve(name: &str) -> (Tz, Resolution) {
    if let Ok(tz) = name.parse::<Tz>() {
        return (tz, Resolution::Exact);
    }

    if let Some(tz) = lookup_legacy(name) {
        return (tz, Resolution::Exact);
    }

    let stripped = DISAMBIGUATOR_RE.replace_all(name, "");
    if stripped != name {
        if let Some(tz) = lookup_legacy(&stripped) {
            return (
                tz,
                Resolution::Compatibility {
                    original: name.to_string(),
                    matched: stripped.into_owned(),
                },
            );
        }
    }

    (
        Tz::UTC,
        Resolution::Unmapped {
            name: name.to_string(),
        },
    )
}

fn lookup_legacy(name: &str) -> Option<Tz> {
    legacy::lookup(name).and_then(|iana| iana.parse().ok())
}
