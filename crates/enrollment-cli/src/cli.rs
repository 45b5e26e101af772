//! CLI argument definitions for the enrollment report.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "nih-report",
    version,
    about = "NIH enrollment report - race, ethnicity and gender counts from REDCap",
    long_about = "Build the NIH inclusion enrollment report from a REDCap project.\n\n\
                  Enrollments are filtered by grant, protocol and enrollment date, and\n\
                  the matching participants are counted by race, ethnicity and gender."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow record identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Settings file to use instead of the platform default.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

/// Where records come from.
#[derive(Args)]
pub struct ConnectionArgs {
    /// REDCap API URL (default: from settings).
    #[arg(long = "url", value_name = "URL", global = true)]
    pub url: Option<String>,

    /// REDCap project API token.
    #[arg(
        long = "api-key",
        value_name = "TOKEN",
        env = "NIH_REPORT_API_KEY",
        hide_env_values = true,
        global = true
    )]
    pub api_key: Option<String>,

    /// Read JSON exports from a directory instead of calling the API.
    #[arg(long = "fixtures", value_name = "DIR", global = true, conflicts_with = "url")]
    pub fixtures: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List report categories and selectable grants and protocols.
    Categories,

    /// Build the report for a selection and print it.
    Report(ReportArgs),

    /// Manage the settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
pub struct ReportArgs {
    /// Grant to include (repeatable).
    #[arg(long = "grant", value_name = "GRANT", conflicts_with = "all_grants")]
    pub grants: Vec<String>,

    /// Include every grant defined in the project.
    #[arg(long = "all-grants")]
    pub all_grants: bool,

    /// Protocol to include (repeatable).
    #[arg(long = "protocol", value_name = "PROTOCOL", conflicts_with = "all_protocols")]
    pub protocols: Vec<String>,

    /// Include every protocol defined in the project.
    #[arg(long = "all-protocols")]
    pub all_protocols: bool,

    /// First enrollment date, inclusive (YYYY-MM-DD, default: today).
    #[arg(long = "from", value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last enrollment date, inclusive (YYYY-MM-DD, default: today).
    #[arg(long = "to", value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Export the report as CSV. Without a path, writes
    /// report_<from>_to_<to>.csv into the export directory.
    #[arg(long = "export", value_name = "PATH", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,
}

#[derive(Subcommand, Clone, Copy)]
pub enum ConfigAction {
    /// Print the settings file location.
    Path,
    /// Print the effective settings (API key hidden).
    Show,
    /// Write a settings file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long = "force")]
        force: bool,
    },
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_arguments_parse() {
        let cli = Cli::try_parse_from([
            "nih-report",
            "report",
            "--grant",
            "G1",
            "--grant",
            "G2",
            "--all-protocols",
            "--from",
            "2022-01-01",
            "--to",
            "2022-01-31",
            "--export",
        ])
        .unwrap();
        let Command::Report(args) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.grants, vec!["G1", "G2"]);
        assert!(args.all_protocols);
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2022, 1, 1));
        assert_eq!(args.export, Some(None));
    }

    #[test]
    fn fixtures_and_url_conflict() {
        let result = Cli::try_parse_from([
            "nih-report",
            "--url",
            "https://example.org/api/",
            "--fixtures",
            "data",
            "categories",
        ]);
        assert!(result.is_err());
    }
}
