//! Records exchanged with the data source.

use serde::{Deserialize, Serialize};

pub const FIELD_GRANT: &str = "grant";
pub const FIELD_PROTOCOL: &str = "protocol";
pub const FIELD_ENROLLMENT: &str = "enrollment";
pub const FIELD_RACE: &str = "race";
pub const FIELD_ETHNICITY: &str = "ethnicity";
pub const FIELD_GENDER: &str = "gender";

/// One participant's enrollment event.
///
/// Values are kept as delivered; blank strings are folded to `None` so that
/// "unset on the platform" and "missing from the export" look the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub record_id: String,
    pub grant: Option<String>,
    pub protocol: Option<String>,
    /// Raw enrollment date text, parsed by the filter.
    pub enrollment_date: Option<String>,
}

impl EnrollmentRecord {
    #[must_use]
    pub fn new(
        record_id: impl Into<String>,
        grant: Option<String>,
        protocol: Option<String>,
        enrollment_date: Option<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            grant: present(grant),
            protocol: present(protocol),
            enrollment_date: present(enrollment_date),
        }
    }
}

/// One participant's demographic labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub record_id: String,
    pub race: String,
    pub ethnicity: String,
    pub gender: String,
}

impl ParticipantRecord {
    #[must_use]
    pub fn new(
        record_id: impl Into<String>,
        race: impl Into<String>,
        ethnicity: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            record_id: record_id.into(),
            race: race.into(),
            ethnicity: ethnicity.into(),
            gender: gender.into(),
        }
    }
}

/// Field definition as returned by a metadata export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    pub field_name: String,
    /// Choice list encoded as `code, label | code, label | ...`.
    #[serde(default)]
    pub select_choices_or_calculations: String,
}

impl FieldMetadata {
    #[must_use]
    pub fn new(field_name: impl Into<String>, choices: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            select_choices_or_calculations: choices.into(),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
