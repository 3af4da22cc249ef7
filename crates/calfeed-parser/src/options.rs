//! Per-call parse configuration and diagnostic reporting.

use std::fmt;
use std::sync::Arc;

use calfeed_core::Diagnostic;
use tracing::warn;

use crate::error::{ParseError, ParseResult};

/// What the parser should do after reporting a diagnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagnosticAction {
    /// Keep parsing with the fallback value.
    #[default]
    Continue,
    /// Abort the parse with [`ParseError::Escalated`].
    Escalate,
}

/// Callback invoked for every diagnostic.
pub type DiagnosticHandler = Arc<dyn Fn(&Diagnostic) -> DiagnosticAction + Send + Sync>;

/// Options for one parse call.
#[derive(Clone, Default)]
pub struct ParseOptions {
    /// Source identifier (path or URL) attached to diagnostics.
    pub source: String,
    /// Upper bound on generated occurrences per series; 0 disables expansion.
    pub max_repeats: usize,
    /// Convert every instant to UTC after zone resolution.
    pub normalize_to_utc: bool,
    /// Diagnostic callback; diagnostics are only logged and collected if unset.
    pub on_diagnostic: Option<DiagnosticHandler>,
}

impl ParseOptions {
    /// Creates options for the given source with expansion disabled.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Sets the repeat cap.
    #[must_use]
    pub fn with_max_repeats(mut self, max_repeats: usize) -> Self {
        self.max_repeats = max_repeats;
        self
    }

    /// Requests UTC normalization of all instants.
    #[must_use]
    pub fn with_utc(mut self, normalize: bool) -> Self {
        self.normalize_to_utc = normalize;
        self
    }

    /// Installs a diagnostic callback.
    #[must_use]
    pub fn with_diagnostics<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Diagnostic) -> DiagnosticAction + Send + Sync + 'static,
    {
        self.on_diagnostic = Some(Arc::new(handler));
        self
    }

    /// Escalates every diagnostic to an error.
    #[must_use]
    pub fn strict(self) -> Self {
        self.with_diagnostics(|_| DiagnosticAction::Escalate)
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("source", &self.source)
            .field("max_repeats", &self.max_repeats)
            .field("normalize_to_utc", &self.normalize_to_utc)
            .field("on_diagnostic", &self.on_diagnostic.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Routes diagnostics to the log, the handler, and the collected list.
#[derive(Debug)]
pub struct Reporter<'a> {
    options: &'a ParseOptions,
    collected: Vec<Diagnostic>,
}

impl<'a> Reporter<'a> {
    /// Creates a reporter for one parse call.
    pub fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            collected: Vec::new(),
        }
    }

    /// Returns the calendar source identifier.
    pub fn source(&self) -> &str {
        &self.options.source
    }

    /// Reports a diagnostic.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Escalated`] if the handler asks for escalation.
    pub fn report(&mut self, diagnostic: Diagnostic) -> ParseResult<()> {
        warn!("{diagnostic}");

        let action = self
            .options
            .on_diagnostic
            .as_ref()
            .map_or(DiagnosticAction::Continue, |handler| handler(&diagnostic));

        match action {
            DiagnosticAction::Escalate => Err(ParseError::Escalated(diagnostic)),
            DiagnosticAction::Continue => {
                self.collected.push(diagnostic);
                Ok(())
            }
        }
    }

    /// Returns the diagnostics reported so far.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.collected
    }
}
