use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{Local, NaiveDate};
use tracing::{debug, info, info_span};

use enrollment_cli::logging::redact_value;
use enrollment_cli::settings::{Settings, load_settings, save_settings_to, settings_path};
use enrollment_cli::summary::{categories_table, print_report};
use enrollment_core::{RecordSource, ReportSession};
use enrollment_model::FilterCriteria;
use enrollment_redcap::{FixtureSource, RedcapClient};

use crate::cli::{ConfigAction, ConnectionArgs, ReportArgs};

pub fn run_categories(connection: &ConnectionArgs, config: Option<&Path>) -> Result<()> {
    let settings = load_settings(config);
    let source = open_source(connection, &settings)?;
    let session = ReportSession::connect(source.as_ref())?;
    println!("{}", categories_table(session.axes(), session.options()));
    Ok(())
}

pub fn run_report(
    args: &ReportArgs,
    connection: &ConnectionArgs,
    config: Option<&Path>,
) -> Result<()> {
    let settings = load_settings(config);
    let source = open_source(connection, &settings)?;
    let mut session = ReportSession::connect(source.as_ref())?;

    let today = Local::now().date_naive();
    let criteria = build_criteria(args, &session, today);
    let span = info_span!(
        "report",
        grants = criteria.grants.len(),
        protocols = criteria.protocols.len()
    );
    let _guard = span.enter();

    session.update(source.as_ref(), criteria)?;
    let report = session
        .current()
        .ok_or_else(|| anyhow!("no report after update"))?;
    debug!(record_ids = %format_ids(report.record_ids()), "matched records");
    let grid = session.render()?;
    print_report(report, &grid, session.axes());

    if let Some(target) = &args.export {
        let default_name = report.default_file_name();
        let path = export_path(target.as_deref(), &settings, &default_name);
        session.export(&path)?;
        println!("Exported: {}", path.display());
    }
    Ok(())
}

pub fn run_config(action: ConfigAction, config: Option<&Path>) -> Result<()> {
    let path = config
        .map(Path::to_path_buf)
        .or_else(settings_path)
        .context("could not determine settings path; pass --config")?;
    match action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Show => {
            let settings = load_settings(Some(&path));
            let text =
                toml::to_string_pretty(&settings.redacted()).context("serialize settings")?;
            print!("{text}");
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            save_settings_to(&Settings::default(), &path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Fixtures when given, otherwise the API with flag values over settings.
fn open_source(
    connection: &ConnectionArgs,
    settings: &Settings,
) -> Result<Box<dyn RecordSource>> {
    let id_field = settings.redcap.record_id_field.as_str();
    if let Some(dir) = &connection.fixtures {
        let source = FixtureSource::open(dir, id_field)
            .with_context(|| format!("open fixtures in {}", dir.display()))?;
        return Ok(Box::new(source));
    }
    let url = connection
        .url
        .clone()
        .unwrap_or_else(|| settings.redcap.api_url.clone());
    let api_key = connection
        .api_key
        .clone()
        .or_else(|| settings.redcap.api_key.clone())
        .context("no API key; pass --api-key or set NIH_REPORT_API_KEY")?;
    info!(url = %url, "connecting to REDCap");
    let client = RedcapClient::new(url, api_key)
        .context("create REDCap client")?
        .with_record_id_field(id_field);
    Ok(Box::new(client))
}

fn build_criteria(args: &ReportArgs, session: &ReportSession, today: NaiveDate) -> FilterCriteria {
    let grants = if args.all_grants {
        session.options().grants.clone()
    } else {
        args.grants.clone()
    };
    let protocols = if args.all_protocols {
        session.options().protocols.clone()
    } else {
        args.protocols.clone()
    };
    FilterCriteria::new(
        grants,
        protocols,
        args.from.unwrap_or(today),
        args.to.unwrap_or(today),
    )
}

/// An explicit directory gets the default file name appended; no path means
/// the configured export directory.
fn export_path(target: Option<&Path>, settings: &Settings, default_name: &str) -> PathBuf {
    match target {
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => settings.export.resolved_directory().join(default_name),
    }
}

fn format_ids(ids: &BTreeSet<String>) -> String {
    let joined = ids.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    redact_value(&joined).to_string()
}
