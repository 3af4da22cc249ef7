//! Content-line lookup.
//!
//! Unfolding and property tokenizing are done by the `ical` crate: its
//! [`LineReader`] joins continuation lines and its [`PropertyParser`] splits
//! each logical line into name, parameters and value. A [`Block`] keeps the
//! properties of the outermost component only (`BEGIN:VALARM` ...
//! `END:VALARM` and the delimiters are skipped) and fields are looked up by
//! tag name.
//!
//! Lines the tokenizer rejects, such as a parameter with an unbalanced
//! quote, are split at their first `:` instead of being dropped.

use ical::{LineReader, PropertyParser};
use tracing::trace;

/// One unfolded `NAME;PARAM=VALUE:value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name, as written.
    pub name: String,
    /// Parameters in order of appearance, quotes removed from values.
    pub params: Vec<(String, String)>,
    /// Everything after the name and parameters, trimmed.
    pub value: String,
}

impl ContentLine {
    /// Parses a single logical line.
    ///
    /// Returns `None` for lines without a name or a `:` separator.
    pub fn parse(line: &str) -> Option<Self> {
        let parsed = match PropertyParser::from_reader(line.as_bytes()).next()? {
            Ok(property) => Self {
                name: property.name.trim().to_string(),
                params: property
                    .params
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(key, values)| (key.trim().to_string(), unquote(&values.join(","))))
                    .collect(),
                value: property.value.unwrap_or_default().trim().to_string(),
            },
            Err(err) => {
                trace!(error = %err, line, "tokenizer rejected line, splitting at first colon");
                Self::split_at_colon(line)?
            }
        };

        (!parsed.name.is_empty()).then_some(parsed)
    }

    fn split_at_colon(line: &str) -> Option<Self> {
        let (head, value) = line.split_once(':')?;
        let mut parts = head.split(';');
        let name = parts.next().unwrap_or_default().trim().to_string();
        let params = parts
            .filter_map(|part| part.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), unquote(value)))
            .collect();

        Some(Self {
            name,
            params,
            value: value.trim().to_string(),
        })
    }

    /// Returns true if this line's name is `tag` (case-insensitive).
    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    /// Returns the value of parameter `key` (case-insensitive), if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if parameter `key` is present with value `value`.
    pub fn has_param(&self, key: &str, value: &str) -> bool {
        self.param(key)
            .is_some_and(|v| v.eq_ignore_ascii_case(value))
    }
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').to_string()
}

/// The content lines of one component, nested components excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    lines: Vec<ContentLine>,
}

impl Block {
    /// Scans `text` into the content lines of its outermost component.
    ///
    /// Text without any `BEGIN:` line is taken whole, which lets single
    /// property snippets be parsed directly.
    pub fn parse(text: &str) -> Self {
        let mut depth = 0usize;
        let mut lines = Vec::new();

        for logical in LineReader::new(text.as_bytes()) {
            let Some(line) = ContentLine::parse(logical.as_str()) else {
                continue;
            };
            if line.is("BEGIN") {
                depth += 1;
                continue;
            }
            if line.is("END") {
                depth = depth.saturating_sub(1);
                continue;
            }
            if depth <= 1 {
                lines.push(line);
            }
        }

        Self { lines }
    }

    /// Returns the first line named `tag`.
    pub fn first(&self, tag: &str) -> Option<&ContentLine> {
        self.lines.iter().find(|line| line.is(tag))
    }

    /// Returns every line named `tag`, in document order.
    pub fn all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ContentLine> + 'a {
        self.lines.iter().filter(move |line| line.is(tag))
    }
}

/// Returns the value of the first line named `tag`, or `""` if absent.
pub fn extract_field(tag: &str, block: &Block) -> String {
    block
        .first(tag)
        .map(|line| line.value.clone())
        .unwrap_or_default()
}
