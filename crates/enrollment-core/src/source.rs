//! Boundary to whatever serves metadata and records.

use std::collections::BTreeSet;

use enrollment_model::{EnrollmentRecord, FieldMetadata, ParticipantRecord, SourceError};

/// Read-only access to a project's metadata and records.
///
/// Calls are blocking and are not retried; a failure surfaces to the caller
/// as-is.
pub trait RecordSource {
    /// Metadata entries for the named fields. Unknown fields are omitted.
    fn field_metadata(&self, fields: &[&str]) -> Result<Vec<FieldMetadata>, SourceError>;

    /// Every enrollment row, with grant, protocol and date as labels.
    fn enrollments(&self) -> Result<Vec<EnrollmentRecord>, SourceError>;

    /// Demographic rows for the given record ids.
    fn participants(
        &self,
        record_ids: &BTreeSet<String>,
    ) -> Result<Vec<ParticipantRecord>, SourceError>;
}

/// A source holding everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub metadata: Vec<FieldMetadata>,
    pub enrollments: Vec<EnrollmentRecord>,
    pub participants: Vec<ParticipantRecord>,
}

impl RecordSource for MemorySource {
    fn field_metadata(&self, fields: &[&str]) -> Result<Vec<FieldMetadata>, SourceError> {
        Ok(self
            .metadata
            .iter()
            .filter(|field| fields.contains(&field.field_name.as_str()))
            .cloned()
            .collect())
    }

    fn enrollments(&self) -> Result<Vec<EnrollmentRecord>, SourceError> {
        Ok(self.enrollments.clone())
    }

    fn participants(
        &self,
        record_ids: &BTreeSet<String>,
    ) -> Result<Vec<ParticipantRecord>, SourceError> {
        Ok(self
            .participants
            .iter()
            .filter(|participant| record_ids.contains(&participant.record_id))
            .cloned()
            .collect())
    }
}
