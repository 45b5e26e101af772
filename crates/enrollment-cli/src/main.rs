//! NIH enrollment report CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use enrollment_cli::logging::{LogConfig, LogFormat, init_logging};
use enrollment_model::ReportError;
use enrollment_redcap::RedcapError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_categories, run_config, run_report};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let config = cli.config.as_deref();
    let result = match &cli.command {
        Command::Categories => run_categories(&cli.connection, config),
        Command::Report(args) => run_report(args, &cli.connection, config),
        Command::Config { action } => run_config(*action, config),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            tracing::debug!(error = %format!("{error:#}"), "command failed");
            eprintln!("error: {}", user_message(&error));
            1
        }
    };
    std::process::exit(exit_code);
}

/// The friendliest message available for `error`.
fn user_message(error: &anyhow::Error) -> String {
    for cause in error.chain() {
        if let Some(report) = cause.downcast_ref::<ReportError>() {
            return report.user_message();
        }
        if let Some(redcap) = cause.downcast_ref::<RedcapError>() {
            return redcap.user_message();
        }
    }
    format!("{error:#}")
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use enrollment_model::SourceError;

    use super::*;

    #[test]
    fn rejected_key_is_named_through_the_session_error() {
        let source = SourceError::from(RedcapError::Api {
            status: 401,
            message: "You do not have permissions to use the API".to_string(),
        });
        let result: Result<(), ReportError> = Err(source.into());
        let error = result.context("failed to connect").unwrap_err();
        assert!(user_message(&error).contains("API key"));
    }

    #[test]
    fn unknown_errors_print_their_chain() {
        let error = anyhow::anyhow!("disk full").context("failed to save settings");
        assert_eq!(user_message(&error), "failed to save settings: disk full");
    }
}
