//! Decoding of REDCap JSON exports into report records.
//!
//! Record exports are arrays of flat objects keyed by field name. Values are
//! strings when exported as labels; anything that is not a non-blank string is
//! treated as absent. Rows without a record id are dropped.

use enrollment_model::{
    EnrollmentRecord, FIELD_ENROLLMENT, FIELD_ETHNICITY, FIELD_GENDER, FIELD_GRANT,
    FIELD_PROTOCOL, FIELD_RACE, FieldMetadata, ParticipantRecord,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Result;

/// One flat row of a record export.
pub type Row = Map<String, Value>;

/// Body REDCap sends alongside a non-success status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Decode a metadata export.
///
/// # Errors
///
/// Returns [`crate::RedcapError::JsonParse`] if `body` is not an array of
/// field objects.
pub fn decode_metadata(body: &[u8]) -> Result<Vec<FieldMetadata>> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a record export into raw rows.
///
/// # Errors
///
/// Returns [`crate::RedcapError::JsonParse`] if `body` is not an array of
/// objects.
pub fn decode_rows(body: &[u8]) -> Result<Vec<Row>> {
    Ok(serde_json::from_slice(body)?)
}

/// Enrollment rows, keyed by `id_field`.
#[must_use]
pub fn enrollments_from_rows(rows: &[Row], id_field: &str) -> Vec<EnrollmentRecord> {
    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| {
            let id = record_id(row, id_field)?;
            Some(EnrollmentRecord::new(
                id,
                text(row, FIELD_GRANT),
                text(row, FIELD_PROTOCOL),
                text(row, FIELD_ENROLLMENT),
            ))
        })
        .collect();
    log_dropped(rows.len(), records.len(), id_field);
    records
}

/// Participant rows, keyed by `id_field`. Absent values become empty labels,
/// which never match a category.
#[must_use]
pub fn participants_from_rows(rows: &[Row], id_field: &str) -> Vec<ParticipantRecord> {
    let records: Vec<_> = rows
        .iter()
        .filter_map(|row| {
            let id = record_id(row, id_field)?;
            Some(ParticipantRecord::new(
                id,
                text(row, FIELD_RACE).unwrap_or_default(),
                text(row, FIELD_ETHNICITY).unwrap_or_default(),
                text(row, FIELD_GENDER).unwrap_or_default(),
            ))
        })
        .collect();
    log_dropped(rows.len(), records.len(), id_field);
    records
}

/// Non-blank string value of `field`.
fn text(row: &Row, field: &str) -> Option<String> {
    match row.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Record ids are strings in REDCap exports; numeric ids from hand-written
/// fixtures are accepted too.
fn record_id(row: &Row, id_field: &str) -> Option<String> {
    match row.get(id_field) {
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => text(row, id_field),
    }
}

fn log_dropped(total: usize, kept: usize, id_field: &str) {
    if kept < total {
        debug!(dropped = total - kept, id_field, "rows without a record id");
    }
}
