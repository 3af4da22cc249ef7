//! Client error types.

use std::fmt;
use std::path::PathBuf;

use calfeed_parser::ParseError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// The document does not exist at the given path.
    NotFound(PathBuf),
    /// Fetching a remote document failed.
    Fetch(String),
    /// IO error.
    Io(std::io::Error),
    /// The document could not be parsed.
    Parse(ParseError),
    /// Rendering output failed.
    Render(String),
}

impl ClientError {
    /// Creates a fetch error.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::NotFound(path) => write!(f, "calendar not found: {}", path.display()),
            Self::Fetch(msg) => write!(f, "fetch failed: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Parse(err) => write!(f, "parse error: {}", err),
            Self::Render(msg) => write!(f, "render error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ParseError> for ClientError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::fetch("request timeout")
        } else if err.is_connect() {
            Self::fetch(format!("connection failed: {}", err))
        } else {
            Self::fetch(format!("request failed: {}", err))
        }
    }
}
