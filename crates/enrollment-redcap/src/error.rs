//! Error types for the REDCap source.

use std::path::PathBuf;

use enrollment_model::SourceError;
use thiserror::Error;

/// Errors raised while talking to REDCap or reading fixture files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RedcapError {
    /// Request could not be sent or the response body could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// REDCap answered with a non-success status.
    #[error("REDCap API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response or fixture body is not the expected JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Fixture file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RedcapError {
    /// Message suitable for showing to the person running the report.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Could not connect to REDCap. Please check the URL and your connection.".to_string()
            }
            Self::Api { status: 401 | 403, .. } => {
                "REDCap rejected the API key. Please check the key and your project rights."
                    .to_string()
            }
            Self::Api { message, .. } => format!("REDCap reported an error: {message}"),
            Self::JsonParse(_) => "REDCap returned data in an unexpected format.".to_string(),
            Self::Io { path, .. } => format!("Could not read {}.", path.display()),
        }
    }
}

impl From<RedcapError> for SourceError {
    fn from(err: RedcapError) -> Self {
        SourceError::with_source(err.user_message(), err)
    }
}

/// Result type alias for REDCap operations.
pub type Result<T> = std::result::Result<T, RedcapError>;
