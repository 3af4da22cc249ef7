//! Command-line interface definition.

use std::path::PathBuf;

use calfeed_core::TracingOutputFormat;
use clap::{Args, Parser, Subcommand};

/// calfeed - iCalendar feeds, expanded and normalized
#[derive(Debug, Parser)]
#[command(name = "calfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALFEED_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log line format: pretty, compact or json (overrides [log] format)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<TracingOutputFormat>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a calendar from a path or URL and print its events
    Parse(ParseArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of the `parse` subcommand.
#[derive(Debug, Clone, Args)]
pub struct ParseArgs {
    /// Local path, file:// URL or http(s):// URL of the calendar
    pub locator: String,

    /// Cap on generated occurrences per recurring event (0 disables expansion)
    #[arg(long)]
    pub max_repeats: Option<usize>,

    /// Normalize every instant to UTC
    #[arg(long)]
    pub utc: bool,

    /// Fail on timezone diagnostics instead of falling back
    #[arg(long)]
    pub strict: bool,

    /// Write the raw document to this file before parsing
    #[arg(long, value_name = "PATH")]
    pub raw_out: Option<PathBuf>,

    /// Output the parsed calendar as JSON
    #[arg(long)]
    pub json: bool,

    /// Maximum summary length (truncated with ellipsis)
    #[arg(long)]
    pub max_title_length: Option<usize>,
}

/// Config subcommand actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump the effective configuration
    Dump,
    /// Validate the configuration
    Validate,
    /// Show the configuration file path
    Path,
}
