//! End-to-end report behavior over an in-memory source.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use enrollment_core::render::GRAND_TOTAL_LABEL;
use enrollment_core::{
    GridLayout, MemorySource, RecordSource, ReportSession, encode_csv, filter_enrollments,
};
use enrollment_model::{
    AggregateResult, AggregateShape, EnrollmentRecord, ExportError, FieldMetadata, FilterCriteria,
    ParticipantRecord, ReportError, SourceError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn enrollment(id: &str, grant: &str, protocol: &str, on: &str) -> EnrollmentRecord {
    EnrollmentRecord::new(
        id,
        Some(grant.to_string()),
        Some(protocol.to_string()),
        Some(on.to_string()),
    )
}

fn metadata() -> Vec<FieldMetadata> {
    vec![
        FieldMetadata::new("grant", "1, G1 | 2, G2"),
        FieldMetadata::new("protocol", "1, P1 | 2, P2"),
        FieldMetadata::new("race", "1, Asian | 2, Black | 3, White"),
        FieldMetadata::new(
            "ethnicity",
            "1, Not Hispanic or Latino | 2, Hispanic or Latino",
        ),
        FieldMetadata::new("gender", "1, Female | 2, Male"),
    ]
}

fn source() -> MemorySource {
    MemorySource {
        metadata: metadata(),
        enrollments: vec![
            enrollment("1", "G1", "P1", "2022-01-05"),
            enrollment("2", "G1", "P1", "2022-01-20"),
            enrollment("3", "G2", "P1", "2022-01-10"),
            enrollment("4", "G1", "P2", "2022-02-01"),
        ],
        participants: vec![
            ParticipantRecord::new("1", "White", "Not Hispanic or Latino", "Female"),
            ParticipantRecord::new("2", "White", "Not Hispanic or Latino", "Female"),
            ParticipantRecord::new("3", "Black", "Hispanic or Latino", "Male"),
            ParticipantRecord::new("4", "Asian", "Hispanic or Latino", "Female"),
        ],
    }
}

/// Which fetch a [`FailingSource`] refuses.
#[derive(Clone, Copy)]
enum Failure {
    Enrollments,
    Participants,
}

/// Serves metadata from [`source`] but fails one record fetch.
struct FailingSource {
    inner: MemorySource,
    failure: Failure,
}

impl FailingSource {
    fn new(failure: Failure) -> Self {
        Self {
            inner: source(),
            failure,
        }
    }
}

impl RecordSource for FailingSource {
    fn field_metadata(&self, fields: &[&str]) -> Result<Vec<FieldMetadata>, SourceError> {
        self.inner.field_metadata(fields)
    }

    fn enrollments(&self) -> Result<Vec<EnrollmentRecord>, SourceError> {
        match self.failure {
            Failure::Enrollments => Err(SourceError::new("enrollment export timed out")),
            Failure::Participants => self.inner.enrollments(),
        }
    }

    fn participants(
        &self,
        record_ids: &BTreeSet<String>,
    ) -> Result<Vec<ParticipantRecord>, SourceError> {
        match self.failure {
            Failure::Participants => Err(SourceError::new("participant export timed out")),
            Failure::Enrollments => self.inner.participants(record_ids),
        }
    }
}

fn january(grants: &[&str], protocols: &[&str]) -> FilterCriteria {
    FilterCriteria::new(
        grants.iter().copied(),
        protocols.iter().copied(),
        date(2022, 1, 1),
        date(2022, 1, 31),
    )
}

// ============================================================================
// Filter and aggregate
// ============================================================================

#[test]
fn single_enrollment_inside_window_matches() {
    let records = vec![enrollment("1", "G1", "P1", "2022-01-05")];
    let ids = filter_enrollments(&records, &january(&["G1"], &["P1"]));
    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["1".to_string()]);
}

#[test]
fn two_identical_participants_fill_one_cell() {
    let mut session = ReportSession::connect(&source()).unwrap();
    let axes = session.axes().clone();
    let report = session.update(&source(), january(&["G1"], &["P1"])).unwrap();
    let aggregate = report.aggregate();

    assert_eq!(report.matched_records(), 2);
    assert_eq!(
        aggregate.cell_by_label(
            &axes,
            "White",
            "Not Hispanic or Latino",
            "Female"
        ),
        Some(2)
    );
    assert_eq!(aggregate.row_total(2), Some(2));
    assert_eq!(aggregate.grand_total(), 2);
    assert_eq!(aggregate.matched_total(), 2);
    assert_eq!(aggregate.column_totals(), &[2, 0, 0, 0]);
}

#[test]
fn no_match_still_produces_exportable_zeros() {
    let mut session = ReportSession::connect(&source()).unwrap();
    let report = session.update(&source(), january(&["G2"], &["P2"])).unwrap();
    assert_eq!(report.matched_records(), 0);
    assert_eq!(report.aggregate().grand_total(), 0);

    let rows = session.export_rows().unwrap();
    assert_eq!(rows.len(), 3 + 3 + 1);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn hidden_race_has_no_screen_row_but_a_csv_row() {
    let mut session = ReportSession::connect(&source()).unwrap();
    session
        .update(&source(), january(&["G1", "G2"], &["P1"]))
        .unwrap();

    let grid = session.render().unwrap();
    let layout = GridLayout::new(session.axes());
    assert!(grid.iter_rows().all(|row| row[0] != "Black"));
    let totals_row = layout.totals_row();
    assert_eq!(grid.get(totals_row, layout.race_total_column()), Some("3"));
    assert_eq!(grid.get(totals_row, layout.count_column(1, 1)), Some("1"));
    assert_eq!(
        grid.get(totals_row, layout.trailer_column()),
        Some(GRAND_TOTAL_LABEL)
    );

    let rows = session.export_rows().unwrap();
    let black = rows.iter().find(|row| row[0] == "Black").unwrap();
    assert_eq!(black, &["Black", "0", "0", "0", "1", "1"]);
}

#[test]
fn refreshing_a_grid_equals_a_fresh_render() {
    let mut session = ReportSession::connect(&source()).unwrap();
    let mut grid = session.render().unwrap();

    session.update(&source(), january(&["G1"], &["P1"])).unwrap();
    session.render_into(&mut grid).unwrap();
    assert_eq!(grid, session.render().unwrap());

    session
        .update(
            &source(),
            FilterCriteria::new(["G1"], ["P2"], date(2022, 2, 1), date(2022, 2, 1)),
        )
        .unwrap();
    session.render_into(&mut grid).unwrap();
    session.render_into(&mut grid).unwrap();
    assert_eq!(grid, session.render().unwrap());
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn empty_aggregate_serializes_full_layout() {
    let session = ReportSession::connect(&source()).unwrap();
    let empty = AggregateResult::zeroed(AggregateShape::of(session.axes()));
    let rows = enrollment_core::serialize(
        &empty,
        session.axes(),
        &["G1".to_string()],
        &["P1".to_string()],
    )
    .unwrap();

    let bytes = encode_csv(&rows).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.ends_with("\r\n"));
    assert_eq!(text.matches("\r\n").count(), rows.len());

    insta::assert_snapshot!(text.replace("\r\n", "\n"), @r"
    Grants:,G1
    Protocols:,P1
    ,Not Hispanic or Latino/Female,Not Hispanic or Latino/Male,Hispanic or Latino/Female,Hispanic or Latino/Male
    Asian,0,0,0,0,0
    Black,0,0,0,0,0
    White,0,0,0,0,0
    Totals by Gender and Ethnicity,0,0,0,0,0,<- Total enrollments
    ");
}

#[test]
fn export_before_update_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    let session = ReportSession::connect(&source()).unwrap();

    let err = session.export(&path).unwrap_err();
    assert!(matches!(err, ReportError::Export(ExportError::NoReport)));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn export_writes_csv_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = ReportSession::connect(&source()).unwrap();
    let report = session.update(&source(), january(&["G1"], &["P1"])).unwrap();
    let path = dir.path().join(report.default_file_name());
    assert_eq!(
        path.file_name().unwrap(),
        "report_2022-01-01_to_2022-01-31.csv"
    );

    session.export(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let first_lines: Vec<&str> = text.split("\r\n").take(2).collect();
    assert_eq!(first_lines, vec!["Grants:,G1", "Protocols:,P1"]);
    assert!(text.contains("White,2,0,0,0,2\r\n"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn export_into_missing_directory_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("report.csv");
    let mut session = ReportSession::connect(&source()).unwrap();
    session.update(&source(), january(&["G1"], &["P1"])).unwrap();

    let err = session.export(&path).unwrap_err();
    assert!(matches!(
        err,
        ReportError::Export(ExportError::Io { operation: "create", .. })
    ));
    assert!(!path.exists());
}

// ============================================================================
// Session state
// ============================================================================

#[test]
fn inverted_range_keeps_previous_report() {
    let mut session = ReportSession::connect(&source()).unwrap();
    session.update(&source(), january(&["G1"], &["P1"])).unwrap();

    let inverted = FilterCriteria::new(["G1"], ["P1"], date(2022, 2, 1), date(2022, 1, 1));
    let err = session.update(&source(), inverted).unwrap_err();
    assert!(matches!(err, ReportError::Validation { .. }));

    let kept = session.current().unwrap();
    assert_eq!(kept.criteria().end, date(2022, 1, 31));
    assert_eq!(kept.aggregate().grand_total(), 2);
}

#[test]
fn failed_fetch_keeps_previous_report() {
    for failure in [Failure::Enrollments, Failure::Participants] {
        let mut session = ReportSession::connect(&source()).unwrap();
        session.update(&source(), january(&["G1"], &["P1"])).unwrap();
        let before = session.current().cloned();

        let failing = FailingSource::new(failure);
        let err = session
            .update(&failing, january(&["G1", "G2"], &["P1"]))
            .unwrap_err();
        assert!(matches!(err, ReportError::Source(_)));
        assert!(err.user_message().contains("timed out"));

        assert_eq!(session.current().cloned(), before);
        assert_eq!(session.current().unwrap().aggregate().grand_total(), 2);
        assert!(session.export_rows().is_ok());
    }
}

#[test]
fn reset_clears_report_and_criteria() {
    let mut session = ReportSession::connect(&source()).unwrap();
    session.update(&source(), january(&["G1"], &["P1"])).unwrap();

    let today = date(2024, 6, 30);
    let cleared = session.reset(today);
    assert!(cleared.grants.is_empty());
    assert!(cleared.protocols.is_empty());
    assert_eq!((cleared.start, cleared.end), (today, today));
    assert!(session.current().is_none());
    assert!(matches!(
        session.export_rows().unwrap_err(),
        ReportError::Export(ExportError::NoReport)
    ));
}

#[test]
fn connect_exposes_selection_lists() {
    let session = ReportSession::connect(&source()).unwrap();
    assert_eq!(session.options().grants, vec!["G1", "G2"]);
    assert_eq!(session.options().protocols, vec!["P1", "P2"]);
    assert_eq!(session.axes().race.len(), 3);
}

#[test]
fn connect_rejects_missing_axis() {
    let mut source = source();
    source.metadata.retain(|field| field.field_name != "gender");
    let err = ReportSession::connect(&source).unwrap_err();
    assert!(matches!(err, ReportError::Configuration { .. }));
}
