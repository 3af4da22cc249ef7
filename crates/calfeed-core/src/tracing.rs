//! Log output for calfeed.
//!
//! Events from every calfeed crate go to stderr through one
//! `tracing-subscriber` layer. The level applies to calfeed targets only,
//! `RUST_LOG` or an explicit filter replaces it entirely.
//!
//! ```ignore
//! use calfeed_core::tracing::{init_tracing, TracingConfig, TracingOutputFormat};
//!
//! let config = TracingConfig::default()
//!     .with_level_name("info")?
//!     .with_format(TracingOutputFormat::Json);
//! init_tracing(config)?;
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{layer, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Crate targets that the configured level applies to.
const TARGETS: &[&str] = &["calfeed_core", "calfeed_parser", "calfeed_client", "calfeed"];

/// Errors raised while building or installing the subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("unknown log level: {0}")]
    Level(String),

    #[error("unknown log format: {0} (expected pretty, compact or json)")]
    Format(String),
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingOutputFormat {
    /// Multi-line, human oriented
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl FromStr for TracingOutputFormat {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(TracingError::Format(other.to_string())),
        }
    }
}

impl fmt::Display for TracingOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

/// Subscriber settings.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for calfeed targets when no filter is given
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Source file, line and target on every event
    pub include_location: bool,
    pub include_timestamp: bool,
    /// Emit span open/close events
    pub include_span_events: bool,
    /// Filter directive that replaces both `default_level` and `RUST_LOG`
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_timestamp: false,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Debug level with source locations, for `-v`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Sets the level from its name (`trace`, `debug`, `info`, `warn`, `error`).
    pub fn with_level_name(self, name: &str) -> Result<Self, TracingError> {
        let level = Level::from_str(name.trim()).map_err(|_| TracingError::Level(name.to_string()))?;
        Ok(self.with_level(level))
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.include_timestamp = enabled;
        self
    }

    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.include_span_events = enabled;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Returns the directive used when neither `env_filter` nor `RUST_LOG`
    /// is set, e.g. `calfeed_core=warn,calfeed_parser=warn,...`.
    pub fn default_directive(&self) -> String {
        let level = self.default_level.to_string().to_lowercase();
        TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Builds the filter: explicit directive, then `RUST_LOG`, then the
    /// default directive.
    pub fn filter(&self) -> Result<EnvFilter, TracingError> {
        match &self.env_filter {
            Some(directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Builds the stderr output layer.
    pub fn layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let base = layer()
            .with_writer(std::io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_target(self.include_location)
            .with_span_events(self.span_events());

        match (self.output_format, self.include_timestamp) {
            (TracingOutputFormat::Pretty, true) => base.pretty().boxed(),
            (TracingOutputFormat::Pretty, false) => base.pretty().without_time().boxed(),
            (TracingOutputFormat::Compact, true) => base.compact().boxed(),
            (TracingOutputFormat::Compact, false) => base.compact().without_time().boxed(),
            (TracingOutputFormat::Json, true) => base.json().boxed(),
            (TracingOutputFormat::Json, false) => base.json().without_time().boxed(),
        }
    }
}

/// Installs the global subscriber. Call once, at startup.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or if the filter
/// directive does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let subscriber = tracing_subscriber::registry()
        .with(config.filter()?)
        .with(config.layer());
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod config {
        use super::*;

        #[test]
        fn quiet_by_default() {
            let config = TracingConfig::default();
            assert_eq!(config.default_level, Level::WARN);
            assert_eq!(config.output_format, TracingOutputFormat::Compact);
            assert!(!config.include_location);
            assert!(!config.include_timestamp);
            assert!(config.env_filter.is_none());
        }

        #[test]
        fn cli_debug_adds_locations() {
            let config = TracingConfig::cli_debug();
            assert_eq!(config.default_level, Level::DEBUG);
            assert!(config.include_location);
            assert_eq!(config.output_format, TracingOutputFormat::Compact);
        }

        #[test]
        fn builders() {
            let config = TracingConfig::default()
                .with_level_name("Trace")
                .unwrap()
                .with_format(TracingOutputFormat::Json)
                .with_timestamps(true)
                .with_span_events(true)
                .with_env_filter("calfeed_parser=trace");

            assert_eq!(config.default_level, Level::TRACE);
            assert_eq!(config.output_format, TracingOutputFormat::Json);
            assert!(config.include_timestamp);
            assert_eq!(config.span_events(), FmtSpan::NEW | FmtSpan::CLOSE);
            assert_eq!(config.env_filter.as_deref(), Some("calfeed_parser=trace"));
        }

        #[test]
        fn unknown_level() {
            let err = TracingConfig::default().with_level_name("loud").unwrap_err();
            assert!(matches!(err, TracingError::Level(name) if name == "loud"));
        }
    }

    mod filter {
        use super::*;

        #[test]
        fn default_directive_covers_all_crates() {
            let directive = TracingConfig::default().with_level(Level::INFO).default_directive();
            insta::assert_snapshot!(
                directive,
                @"calfeed_core=info,calfeed_parser=info,calfeed_client=info,calfeed=info"
            );
            assert!(EnvFilter::try_new(&directive).is_ok());
        }

        #[test]
        fn explicit_directive_is_validated() {
            let config = TracingConfig::default().with_env_filter("calfeed_parser=[");
            assert!(matches!(config.filter(), Err(TracingError::EnvFilter(_))));

            let config = TracingConfig::default().with_env_filter("calfeed_parser=trace");
            assert!(config.filter().is_ok());
        }
    }

    mod format {
        use super::*;

        #[test]
        fn parses_names() {
            assert_eq!("json".parse::<TracingOutputFormat>().unwrap(), TracingOutputFormat::Json);
            assert_eq!(" Pretty ".parse::<TracingOutputFormat>().unwrap(), TracingOutputFormat::Pretty);
            assert!(matches!(
                "xml".parse::<TracingOutputFormat>(),
                Err(TracingError::Format(_))
            ));
        }

        #[test]
        fn display_matches_config_spelling() {
            for format in [
                TracingOutputFormat::Pretty,
                TracingOutputFormat::Compact,
                TracingOutputFormat::Json,
            ] {
                let json = serde_json::to_string(&format).unwrap();
                assert_eq!(json, format!("\"{format}\""));
            }
        }

        #[test]
        fn every_format_builds_a_layer() {
            for format in [
                TracingOutputFormat::Pretty,
                TracingOutputFormat::Compact,
                TracingOutputFormat::Json,
            ] {
                for timestamps in [true, false] {
                    let config = TracingConfig::default()
                        .with_format(format)
                        .with_timestamps(timestamps);
                    let subscriber = tracing_subscriber::registry()
                        .with(config.filter().unwrap())
                        .with(config.layer());
                    tracing::subscriber::with_default(subscriber, || {
                        tracing::warn!(format = %format, "layer smoke event");
                    });
                }
            }
        }
    }
}
