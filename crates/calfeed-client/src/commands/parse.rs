//! The `parse` command.

use calfeed_core::{Calendar, FormatOptions, OutputFormat, OutputFormatter};

use crate::cli::ParseArgs;
use crate::config::{ClientConfig, DisplaySettings, ParseSettings};
use crate::error::{ClientError, ClientResult};
use crate::loader::load_and_parse;

/// Loads, parses and prints one calendar.
pub async fn run(args: &ParseArgs, config: &ClientConfig) -> ClientResult<()> {
    let (settings, display) = effective_settings(args, config);
    let options = settings.to_options(args.locator.as_str());

    let calendar = load_and_parse(
        &args.locator,
        &config.fetch,
        options,
        args.raw_out.as_deref(),
    )
    .await?;

    for diagnostic in &calendar.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    println!("{}", render(&calendar, format, display.to_format_options())?);
    Ok(())
}

/// Applies command-line overrides on top of the configuration file.
pub fn effective_settings(
    args: &ParseArgs,
    config: &ClientConfig,
) -> (ParseSettings, DisplaySettings) {
    let mut settings = config.parse.clone();
    if let Some(max) = args.max_repeats {
        settings.max_repeats = max;
    }
    settings.normalize_to_utc |= args.utc;
    settings.strict_timezones |= args.strict;

    let mut display = config.display.clone();
    if args.max_title_length.is_some() {
        display.max_title_length = args.max_title_length;
    }
    (settings, display)
}

/// Renders a calendar in the requested format.
pub fn render(
    calendar: &Calendar,
    format: OutputFormat,
    options: FormatOptions,
) -> ClientResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(calendar)
            .map_err(|e| ClientError::Render(format!("failed to serialize calendar: {}", e))),
        OutputFormat::Table => {
            let formatter = OutputFormatter::new(options);
            let mut lines = vec![formatter.format_header(calendar)];
            lines.extend(formatter.format_table(calendar));
            Ok(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calfeed_parser::{ParseOptions, parse_calendar};

    const STANDUP: &str = "BEGIN:VCALENDAR\n\
        VERSION:2.0\n\
        X-WR-CALNAME:Team\n\
        X-WR-TIMEZONE:Europe/Madrid\n\
        BEGIN:VEVENT\n\
        UID:standup@example.com\n\
        DTSTART;TZID=Europe/Madrid:20240506T100000\n\
        DTEND;TZID=Europe/Madrid:20240506T103000\n\
        RRULE:FREQ=DAILY;COUNT=2\n\
        SUMMARY:Standup\n\
        END:VEVENT\n\
        END:VCALENDAR\n";

    fn args(locator: &str) -> ParseArgs {
        ParseArgs {
            locator: locator.to_string(),
            max_repeats: None,
            utc: false,
            strict: false,
            raw_out: None,
            json: false,
            max_title_length: None,
        }
    }

    fn standup() -> Calendar {
        parse_calendar(STANDUP, &ParseOptions::new("team.ics").with_max_repeats(1000)).unwrap()
    }

    mod settings {
        use super::*;

        #[test]
        fn config_values_without_flags() {
            let mut config = ClientConfig::default();
            config.parse.max_repeats = 12;
            config.display.max_title_length = Some(30);

            let (parse, display) = effective_settings(&args("team.ics"), &config);
            assert_eq!(parse.max_repeats, 12);
            assert!(!parse.normalize_to_utc);
            assert_eq!(display.max_title_length, Some(30));
        }

        #[test]
        fn flags_override_config() {
            let mut config = ClientConfig::default();
            config.parse.max_repeats = 12;
            let cli_args = ParseArgs {
                max_repeats: Some(0),
                utc: true,
                strict: true,
                max_title_length: Some(8),
                ..args("team.ics")
            };

            let (parse, display) = effective_settings(&cli_args, &config);
            assert_eq!(parse.max_repeats, 0);
            assert!(parse.normalize_to_utc);
            assert!(parse.strict_timezones);
            assert_eq!(display.max_title_length, Some(8));
        }
    }

    mod raw_output {
        use super::*;

        #[tokio::test]
        async fn unreadable_locator_creates_no_file() {
            let dir = tempfile::tempdir().unwrap();
            let raw = dir.path().join("raw.ics");
            let missing = dir.path().join("missing.ics");
            let cli_args = ParseArgs {
                raw_out: Some(raw.clone()),
                ..args(missing.to_str().unwrap())
            };

            let err = run(&cli_args, &ClientConfig::default()).await.unwrap_err();
            assert!(matches!(err, ClientError::NotFound(_)));
            assert!(!raw.exists());
        }
    }

    mod rendering {
        use super::*;

        #[test]
        fn table_output() {
            let output = render(&standup(), OutputFormat::Table, FormatOptions::default()).unwrap();
            insta::assert_snapshot!(output, @r"
            Team (3 events, Europe/Madrid)
            2024-05-06 10:00-10:30  #0  Standup  [Europe/Madrid]
            2024-05-07 10:00-10:30  #1  Standup  [Europe/Madrid]
            2024-05-08 10:00-10:30  #2  Standup  [Europe/Madrid]
            ");
        }

        #[test]
        fn json_output() {
            let output = render(&standup(), OutputFormat::Json, FormatOptions::default()).unwrap();
            let value: serde_json::Value = serde_json::from_str(&output).unwrap();
            assert_eq!(value["name"], "Team");
            assert_eq!(value["source"], "team.ics");
            assert_eq!(value["events"].as_array().unwrap().len(), 3);
            assert_eq!(value["events"][1]["sequence"], 1);
            assert_eq!(value["events"][1]["start"], "2024-05-07T10:00:00+02:00");
        }

        #[test]
        fn empty_calendar_table() {
            let output =
                render(&Calendar::new("empty.ics"), OutputFormat::Table, FormatOptions::default())
                    .unwrap();
            insta::assert_snapshot!(output, @r"
            empty.ics (0 events, no default zone)
            No events
            ");
        }
    }
}
