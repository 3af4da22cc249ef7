//! CLI, document loading, configuration, output rendering
//!
//! This crate provides the `calfeed` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use loader::{Locator, load_and_parse, load_document};
