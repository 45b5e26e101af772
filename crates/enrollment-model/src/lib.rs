//! Data model for NIH cumulative enrollment reports.
//!
//! The types here are shared by the aggregation engine, the record sources and
//! the command-line front end. They carry no I/O of their own.

pub mod aggregate;
pub mod axis;
pub mod criteria;
pub mod error;
pub mod records;

pub use aggregate::{AggregateBuilder, AggregateResult, AggregateShape};
pub use axis::{AxisConfiguration, Category, CategoryAxis, Dimension, HIDDEN_RACE_LABEL};
pub use criteria::{FilterCriteria, SelectionOptions};
pub use error::{ExportError, ReportError, Result, SourceError};
pub use records::{
    EnrollmentRecord, FIELD_ENROLLMENT, FIELD_ETHNICITY, FIELD_GENDER, FIELD_GRANT,
    FIELD_PROTOCOL, FIELD_RACE, FieldMetadata, ParticipantRecord,
};
