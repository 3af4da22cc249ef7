//! Document loading from local paths and HTTP(S) URLs.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use calfeed_core::Calendar;
use calfeed_parser::{ParseOptions, parse_calendar};
use tracing::{debug, info};
use url::Url;

use crate::config::FetchSettings;
use crate::error::{ClientError, ClientResult};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// An `http` or `https` URL.
    Remote(Url),
    /// A filesystem path, given directly or as a `file://` URL.
    Local(PathBuf),
}

impl Locator {
    /// Classifies a locator string.
    ///
    /// Anything that is not an absolute `http`, `https` or `file` URL is a
    /// path.
    pub fn parse(locator: &str) -> Self {
        match Url::parse(locator) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => Self::Local(path),
                Err(()) => Self::Local(PathBuf::from(locator)),
            },
            _ => Self::Local(PathBuf::from(locator)),
        }
    }

    /// Returns true for HTTP(S) locators.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Loads the raw text of a document.
///
/// # Errors
///
/// - [`ClientError::NotFound`] if a local path does not exist
/// - [`ClientError::Fetch`] on network failure or a non-success status
/// - [`ClientError::Io`] for other filesystem errors
pub async fn load_document(locator: &str, fetch: &FetchSettings) -> ClientResult<String> {
    match Locator::parse(locator) {
        Locator::Remote(url) => fetch_remote(url, fetch).await,
        Locator::Local(path) => read_local(path).await,
    }
}

async fn fetch_remote(url: Url, fetch: &FetchSettings) -> ClientResult<String> {
    let client = reqwest::Client::builder()
        .timeout(fetch.timeout())
        .user_agent(fetch.user_agent.as_str())
        .build()
        .map_err(|e| ClientError::fetch(format!("failed to create HTTP client: {}", e)))?;

    debug!(url = %url, "fetching calendar");
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::fetch(format!("{} returned HTTP {}", url, status)));
    }

    let body = response.text().await?;
    info!(url = %url, bytes = body.len(), "fetched calendar");
    Ok(body)
}

async fn read_local(path: PathBuf) -> ClientResult<String> {
    debug!(path = %path.display(), "reading calendar");
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ClientError::NotFound(path)),
        Err(e) => Err(ClientError::Io(e)),
    }
}

/// Loads a document and parses it.
///
/// When `raw_out` is given, the unparsed text is saved there once loading
/// has succeeded and before parsing, so a document that fails to parse can
/// still be inspected. The locator becomes the calendar source unless
/// `options` already names one.
pub async fn load_and_parse(
    locator: &str,
    fetch: &FetchSettings,
    mut options: ParseOptions,
    raw_out: Option<&Path>,
) -> ClientResult<Calendar> {
    let content = load_document(locator, fetch).await?;

    if let Some(path) = raw_out {
        tokio::fs::write(path, &content).await?;
        debug!(path = %path.display(), bytes = content.len(), "saved raw calendar");
    }

    if options.source.is_empty() {
        options.source = locator.to_string();
    }
    Ok(parse_calendar(&content, &options)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "BEGIN:VCALENDAR\r\n\
        VERSION:2.0\r\n\
        X-WR-CALNAME:Loader\r\n\
        BEGIN:VEVENT\r\n\
        UID:one@example.com\r\n\
        DTSTART:20240506T100000Z\r\n\
        DTEND:20240506T110000Z\r\n\
        SUMMARY:Only event\r\n\
        END:VEVENT\r\n\
        END:VCALENDAR\r\n";

    fn write_calendar(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("calendar.ics");
        std::fs::write(&path, content).unwrap();
        path
    }

    mod locators {
        use super::*;

        #[test]
        fn http_and_https_are_remote() {
            assert!(Locator::parse("https://example.com/team.ics").is_remote());
            assert!(Locator::parse("http://example.com/team.ics").is_remote());
        }

        #[test]
        fn paths_are_local() {
            assert_eq!(
                Locator::parse("calendars/team.ics"),
                Locator::Local(PathBuf::from("calendars/team.ics"))
            );
            assert_eq!(
                Locator::parse("/tmp/team.ics"),
                Locator::Local(PathBuf::from("/tmp/team.ics"))
            );
        }

        #[test]
        fn file_url_becomes_path() {
            assert_eq!(
                Locator::parse("file:///tmp/team.ics"),
                Locator::Local(PathBuf::from("/tmp/team.ics"))
            );
        }

        #[test]
        fn other_schemes_are_paths() {
            assert!(!Locator::parse("webcal://example.com/team.ics").is_remote());
        }
    }

    mod loading {
        use super::*;

        #[tokio::test]
        async fn reads_local_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_calendar(&dir, MINIMAL);
            let content = load_document(path.to_str().unwrap(), &FetchSettings::default())
                .await
                .unwrap();
            assert_eq!(content, MINIMAL);
        }

        #[tokio::test]
        async fn missing_file_is_not_found() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("missing.ics");
            let err = load_document(path.to_str().unwrap(), &FetchSettings::default())
                .await
                .unwrap_err();
            assert!(matches!(err, ClientError::NotFound(p) if p == path));
        }

        #[tokio::test]
        async fn parses_with_locator_as_source() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_calendar(&dir, MINIMAL);
            let locator = path.to_str().unwrap();

            let calendar = load_and_parse(
                locator,
                &FetchSettings::default(),
                ParseOptions::default(),
                None,
            )
            .await
            .unwrap();
            assert_eq!(calendar.name, "Loader");
            assert_eq!(calendar.source, locator);
            assert_eq!(calendar.len(), 1);
        }

        #[tokio::test]
        async fn raw_document_is_saved() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_calendar(&dir, MINIMAL);
            let raw = dir.path().join("raw.ics");

            let calendar = load_and_parse(
                path.to_str().unwrap(),
                &FetchSettings::default(),
                ParseOptions::new("named.ics"),
                Some(&raw),
            )
            .await
            .unwrap();
            assert_eq!(std::fs::read_to_string(&raw).unwrap(), MINIMAL);
            assert_eq!(calendar.source, "named.ics");
        }

        #[tokio::test]
        async fn failed_load_leaves_no_raw_file() {
            let dir = tempfile::tempdir().unwrap();
            let raw = dir.path().join("raw.ics");

            let err = load_and_parse(
                dir.path().join("missing.ics").to_str().unwrap(),
                &FetchSettings::default(),
                ParseOptions::default(),
                Some(&raw),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ClientError::NotFound(_)));
            assert!(!raw.exists());
        }

        #[tokio::test]
        async fn parse_errors_propagate_after_raw_is_saved() {
            let dir = tempfile::tempdir().unwrap();
            let broken = MINIMAL.replace("20240506T100000Z", "tomorrow");
            let path = write_calendar(&dir, &broken);
            let raw = dir.path().join("raw.ics");

            let err = load_and_parse(
                path.to_str().unwrap(),
                &FetchSettings::default(),
                ParseOptions::default(),
                Some(&raw),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ClientError::Parse(_)));
            assert_eq!(std::fs::read_to_string(&raw).unwrap(), broken);
        }
    }
}
