//! Blocking REDCap API client.
//!
//! Every call is a single form-encoded POST to the project's API endpoint.
//! Requests are not retried.

use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

use enrollment_core::RecordSource;
use enrollment_model::{
    EnrollmentRecord, FIELD_ENROLLMENT, FIELD_ETHNICITY, FIELD_GENDER, FIELD_GRANT,
    FIELD_PROTOCOL, FIELD_RACE, FieldMetadata, ParticipantRecord, SourceError,
};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::debug;

use crate::error::{RedcapError, Result};
use crate::records::{
    ErrorBody, Row, decode_metadata, decode_rows, enrollments_from_rows, participants_from_rows,
};

type SourceResult<T> = std::result::Result<T, SourceError>;

/// Record id field of a project created with REDCap defaults.
pub const DEFAULT_RECORD_ID_FIELD: &str = "record_id";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT_VALUE: &str = concat!("nih-report/", env!("CARGO_PKG_VERSION"));

/// What a request exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Metadata,
    Record,
}

impl Content {
    fn as_str(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Record => "record",
        }
    }
}

/// Form body of an export request.
///
/// Record exports ask for labels rather than raw codes, flat rows and JSON.
/// `fields[i]` and `records[i]` are indexed from zero in the given order.
#[must_use]
pub fn form_params<'a>(
    token: &str,
    content: Content,
    fields: impl IntoIterator<Item = &'a str>,
    records: impl IntoIterator<Item = &'a str>,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("token".to_string(), token.to_string()),
        ("content".to_string(), content.as_str().to_string()),
        ("format".to_string(), "json".to_string()),
        ("returnFormat".to_string(), "json".to_string()),
    ];
    if content == Content::Record {
        params.push(("type".to_string(), "flat".to_string()));
        params.push(("rawOrLabel".to_string(), "label".to_string()));
    }
    params.extend(
        fields
            .into_iter()
            .enumerate()
            .map(|(i, field)| (format!("fields[{i}]"), field.to_string())),
    );
    params.extend(
        records
            .into_iter()
            .enumerate()
            .map(|(i, record)| (format!("records[{i}]"), record.to_string())),
    );
    params
}

/// Client for one REDCap project, identified by its API token.
pub struct RedcapClient {
    client: Client,
    url: String,
    token: String,
    record_id_field: String,
}

impl RedcapClient {
    /// Create a client for the API at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`RedcapError::Network`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            token: token.into(),
            record_id_field: DEFAULT_RECORD_ID_FIELD.to_string(),
        })
    }

    /// Read record ids from `field` instead of `record_id`.
    #[must_use]
    pub fn with_record_id_field(mut self, field: impl Into<String>) -> Self {
        self.record_id_field = field.into();
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn record_id_field(&self) -> &str {
        &self.record_id_field
    }

    /// Export metadata for the named fields.
    ///
    /// # Errors
    ///
    /// Returns any transport, API or decoding error.
    pub fn export_metadata(&self, fields: &[&str]) -> Result<Vec<FieldMetadata>> {
        let params = form_params(&self.token, Content::Metadata, fields.iter().copied(), []);
        decode_metadata(&self.post(&params)?)
    }

    /// Export the named fields of the given records, or of every record when
    /// `records` is empty. The record id field is always included.
    ///
    /// # Errors
    ///
    /// Returns any transport, API or decoding error.
    pub fn export_records(&self, fields: &[&str], records: &[&str]) -> Result<Vec<Row>> {
        let mut requested = vec![self.record_id_field.as_str()];
        requested.extend(fields.iter().copied().filter(|f| *f != self.record_id_field));
        let params = form_params(
            &self.token,
            Content::Record,
            requested,
            records.iter().copied(),
        );
        decode_rows(&self.post(&params)?)
    }

    fn post(&self, params: &[(String, String)]) -> Result<Vec<u8>> {
        let started = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "application/json")
            .form(params)
            .send()?;

        let status = response.status();
        let body = response.bytes()?.to_vec();
        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            duration_ms = started.elapsed().as_millis(),
            "REDCap response"
        );

        check_response(status, body)
    }
}

/// Turn an API answer into its body, or an [`RedcapError::Api`] when REDCap
/// reports an error. REDCap can put `{"error": ...}` in a 200 response.
fn check_response(status: StatusCode, body: Vec<u8>) -> Result<Vec<u8>> {
    if let Ok(ErrorBody { error }) = serde_json::from_slice::<ErrorBody>(&body) {
        return Err(RedcapError::Api {
            status: status.as_u16(),
            message: error,
        });
    }
    if !status.is_success() {
        return Err(RedcapError::Api {
            status: status.as_u16(),
            message: String::from_utf8_lossy(&body).trim().to_string(),
        });
    }
    Ok(body)
}

impl fmt::Debug for RedcapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedcapClient")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("record_id_field", &self.record_id_field)
            .finish_non_exhaustive()
    }
}

impl RecordSource for RedcapClient {
    fn field_metadata(&self, fields: &[&str]) -> SourceResult<Vec<FieldMetadata>> {
        Ok(self.export_metadata(fields)?)
    }

    fn enrollments(&self) -> SourceResult<Vec<EnrollmentRecord>> {
        let rows = self.export_records(&[FIELD_ENROLLMENT, FIELD_GRANT, FIELD_PROTOCOL], &[])?;
        Ok(enrollments_from_rows(&rows, &self.record_id_field))
    }

    fn participants(
        &self,
        record_ids: &BTreeSet<String>,
    ) -> SourceResult<Vec<ParticipantRecord>> {
        // An empty record list means "all records" to the API.
        if record_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<&str> = record_ids.iter().map(String::as_str).collect();
        let rows = self.export_records(&[FIELD_GENDER, FIELD_ETHNICITY, FIELD_RACE], &ids)?;
        Ok(participants_from_rows(&rows, &self.record_id_field))
    }
}
