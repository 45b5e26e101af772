//! Enrollment report engine.
//!
//! Filters enrollments by grant, protocol and date range, cross-tabulates the
//! matching participants by race × ethnicity × gender and projects the result
//! onto a display grid or CSV rows.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use enrollment_core::{MemorySource, ReportSession};
//! use enrollment_model::{EnrollmentRecord, FieldMetadata, FilterCriteria, ParticipantRecord};
//!
//! let source = MemorySource {
//!     metadata: vec![
//!         FieldMetadata::new("grant", "1, G1"),
//!         FieldMetadata::new("protocol", "1, P1"),
//!         FieldMetadata::new("race", "1, Asian | 2, White"),
//!         FieldMetadata::new("ethnicity", "1, Not Hispanic or Latino"),
//!         FieldMetadata::new("gender", "1, Female | 2, Male"),
//!     ],
//!     enrollments: vec![EnrollmentRecord::new(
//!         "1",
//!         Some("G1".into()),
//!         Some("P1".into()),
//!         Some("2022-01-05".into()),
//!     )],
//!     participants: vec![ParticipantRecord::new("1", "White", "Not Hispanic or Latino", "Female")],
//! };
//!
//! let mut session = ReportSession::connect(&source)?;
//! let criteria = FilterCriteria::new(
//!     ["G1"],
//!     ["P1"],
//!     NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2022, 1, 31).unwrap(),
//! );
//! let report = session.update(&source, criteria)?;
//! assert_eq!(report.aggregate().grand_total(), 1);
//! # Ok::<(), enrollment_model::ReportError>(())
//! ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod registry;
pub mod render;
pub mod session;
pub mod source;

pub use aggregate::aggregate;
pub use export::{default_export_file_name, encode_csv, serialize, write_csv};
pub use filter::{filter_enrollments, parse_enrollment_date};
pub use registry::{choice_labels, load, load_selection_options};
pub use render::{Grid, GridLayout, render, render_into};
pub use session::{Report, ReportSession};
pub use source::{MemorySource, RecordSource};
