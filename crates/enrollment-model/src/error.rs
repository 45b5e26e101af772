//! Error types for report operations.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by connect, update and export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// Category metadata missing or malformed.
    #[error("invalid metadata for field '{field}': {reason}")]
    Configuration { field: String, reason: String },

    /// Start date after end date.
    #[error("start date {start} is after end date {end}")]
    Validation { start: NaiveDate, end: NaiveDate },

    /// Export refused or failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The data source could not deliver.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ReportError {
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Message suitable for showing inline to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { field, reason } => format!(
                "Could not read the '{field}' field definition from the project ({reason}). \
                 Check the project metadata and connect again."
            ),
            Self::Validation { .. } => "Start date must be earlier than end date.".to_string(),
            Self::Export(error) => error.user_message(),
            Self::Source(error) => format!("Could not fetch data: {}", error.message),
        }
    }
}

/// Export failures. No partial file is left behind in any of these cases.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// Export requested before any successful update.
    #[error("no report data available to export")]
    NoReport,

    /// CSV encoding failed.
    #[error("failed to encode CSV: {0}")]
    Csv(String),

    /// Writing the destination failed.
    #[error("failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoReport => "Can't export when there is no data.".to_string(),
            Self::Csv(_) => "Can't save file.".to_string(),
            Self::Io { path, .. } => format!("Can't save file to {}.", path.display()),
        }
    }
}

/// Failure reported by a record source.
///
/// `message` is shown to the user; the underlying error, when there is one,
/// stays reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error("data source error: {message}")]
pub struct SourceError {
    pub message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// A failure caused by `source`.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
