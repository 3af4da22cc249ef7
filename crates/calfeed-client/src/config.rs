//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/calfeed/config.toml` by default. Every section is optional;
//! command-line flags override file values.
//!
//! ```toml
//! [parse]
//! max_repeats = 500
//! normalize_to_utc = true
//!
//! [fetch]
//! timeout = 10
//!
//! [display]
//! max_title_length = 40
//!
//! [log]
//! level = "info"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use calfeed_core::{FormatOptions, TracingConfig, TracingOutputFormat};
use calfeed_parser::ParseOptions;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Default cap on generated occurrences per recurring event.
pub const DEFAULT_MAX_REPEATS: usize = 1000;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the calfeed client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Parser settings.
    pub parse: ParseSettings,

    /// Remote document settings.
    pub fetch: FetchSettings,

    /// Display settings.
    pub display: DisplaySettings,

    /// Log output settings.
    pub log: LogSettings,
}

/// Parser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSettings {
    /// Upper bound on generated occurrences per series; 0 disables expansion.
    pub max_repeats: usize,

    /// Convert every instant to UTC.
    pub normalize_to_utc: bool,

    /// Treat timezone diagnostics as fatal.
    pub strict_timezones: bool,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            max_repeats: DEFAULT_MAX_REPEATS,
            normalize_to_utc: false,
            strict_timezones: false,
        }
    }
}

impl ParseSettings {
    /// Builds parser options for a document loaded from `source`.
    pub fn to_options(&self, source: impl Into<String>) -> ParseOptions {
        let options = ParseOptions::new(source)
            .with_max_repeats(self.max_repeats)
            .with_utc(self.normalize_to_utc);
        if self.strict_timezones {
            options.strict()
        } else {
            options
        }
    }
}

/// Settings for fetching remote documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Request timeout in seconds.
    pub timeout: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: concat!("calfeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetchSettings {
    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Maximum summary length (truncated with ellipsis).
    pub max_title_length: Option<usize>,

    /// Text to show when a calendar has no events.
    pub no_events_text: String,

    /// Append the authored zone to each line.
    pub show_zone: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_title_length: None,
            no_events_text: "No events".to_string(),
            show_zone: true,
        }
    }
}

impl DisplaySettings {
    /// Converts to formatter options.
    pub fn to_format_options(&self) -> FormatOptions {
        FormatOptions {
            max_title_length: self.max_title_length,
            no_events_text: self.no_events_text.clone(),
            show_zone: self.show_zone,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Level for calfeed crates.
    pub level: String,

    /// Line format: `pretty`, `compact` or `json`.
    pub format: TracingOutputFormat,

    /// Prefix each line with a timestamp.
    pub timestamps: bool,

    /// Log span open and close.
    pub span_events: bool,

    /// Filter directive replacing `level` and `RUST_LOG`.
    pub filter: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: TracingOutputFormat::default(),
            timestamps: false,
            span_events: false,
            filter: None,
        }
    }
}

impl LogSettings {
    /// Builds the tracing configuration.
    ///
    /// `debug` forces debug level with source locations; `format` overrides
    /// the configured line format.
    pub fn to_tracing_config(
        &self,
        debug: bool,
        format: Option<TracingOutputFormat>,
    ) -> ClientResult<TracingConfig> {
        let base = if debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::default()
                .with_level_name(&self.level)
                .map_err(|e| ClientError::config(format!("log.level: {}", e)))?
        };

        let mut config = base
            .with_format(format.unwrap_or(self.format))
            .with_timestamps(self.timestamps)
            .with_span_events(self.span_events);
        if let Some(filter) = &self.filter {
            config = config.with_env_filter(filter);
        }
        Ok(config)
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| ClientError::config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calfeed")
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> ClientResult<()> {
        if self.fetch.timeout == 0 {
            return Err(ClientError::config("fetch.timeout must be greater than zero"));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(ClientError::config("fetch.user_agent must not be empty"));
        }
        if self.display.max_title_length == Some(0) {
            return Err(ClientError::config("display.max_title_length must be greater than zero"));
        }
        self.log
            .to_tracing_config(false, None)?
            .filter()
            .map_err(|e| ClientError::config(format!("log.filter: {}", e)))?;
        Ok(())
    }
}
