//! Offline source backed by JSON exports saved to a directory.
//!
//! The directory holds `metadata.json`, `enrollments.json` and
//! `participants.json`, each in the shape the API returns for the matching
//! request.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use enrollment_core::{MemorySource, RecordSource};
use enrollment_model::{EnrollmentRecord, FieldMetadata, ParticipantRecord, SourceError};
use tracing::info;

use crate::error::{RedcapError, Result};
use crate::records::{decode_metadata, decode_rows, enrollments_from_rows, participants_from_rows};

type SourceResult<T> = std::result::Result<T, SourceError>;

pub const METADATA_FILE: &str = "metadata.json";
pub const ENROLLMENTS_FILE: &str = "enrollments.json";
pub const PARTICIPANTS_FILE: &str = "participants.json";

/// Record source read once from a fixture directory.
#[derive(Debug, Clone)]
pub struct FixtureSource {
    dir: PathBuf,
    records: MemorySource,
}

impl FixtureSource {
    /// Read and decode all three fixture files.
    ///
    /// # Errors
    ///
    /// Returns [`RedcapError::Io`] for a missing or unreadable file and
    /// [`RedcapError::JsonParse`] for malformed JSON.
    pub fn open(dir: impl Into<PathBuf>, record_id_field: &str) -> Result<Self> {
        let dir = dir.into();
        let metadata = decode_metadata(&read(&dir.join(METADATA_FILE))?)?;
        let enrollments = enrollments_from_rows(
            &decode_rows(&read(&dir.join(ENROLLMENTS_FILE))?)?,
            record_id_field,
        );
        let participants = participants_from_rows(
            &decode_rows(&read(&dir.join(PARTICIPANTS_FILE))?)?,
            record_id_field,
        );
        info!(
            dir = %dir.display(),
            fields = metadata.len(),
            enrollments = enrollments.len(),
            participants = participants.len(),
            "loaded fixtures"
        );
        Ok(Self {
            dir,
            records: MemorySource {
                metadata,
                enrollments,
                participants,
            },
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| RedcapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl RecordSource for FixtureSource {
    fn field_metadata(&self, fields: &[&str]) -> SourceResult<Vec<FieldMetadata>> {
        self.records.field_metadata(fields)
    }

    fn enrollments(&self) -> SourceResult<Vec<EnrollmentRecord>> {
        self.records.enrollments()
    }

    fn participants(
        &self,
        record_ids: &BTreeSet<String>,
    ) -> SourceResult<Vec<ParticipantRecord>> {
        self.records.participants(record_ids)
    }
}
