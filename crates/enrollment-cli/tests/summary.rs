//! Terminal rendering of the report grid.

use enrollment_cli::summary::{categories_table, report_table};
use enrollment_core::{aggregate, render};
use enrollment_model::{
    AxisConfiguration, CategoryAxis, Dimension, ParticipantRecord, SelectionOptions,
};

fn axes() -> AxisConfiguration {
    AxisConfiguration::new(
        CategoryAxis::new(Dimension::Race, ["Asian", "Black", "White"]).unwrap(),
        CategoryAxis::new(Dimension::Ethnicity, ["Not Hispanic", "Hispanic"]).unwrap(),
        CategoryAxis::new(Dimension::Gender, ["Female", "Male"]).unwrap(),
    )
    .unwrap()
}

#[test]
fn blank_grid_rows_are_skipped() {
    let axes = axes();
    let result = aggregate(
        &axes,
        &[
            ParticipantRecord::new("1", "White", "Hispanic", "Male"),
            ParticipantRecord::new("2", "Black", "Hispanic", "Male"),
        ],
    );
    let grid = render(&result, &axes).unwrap();
    let table = report_table(&grid, &axes);

    // Title, ethnicity and gender headers, Asian, White, totals.
    assert_eq!(table.row_count(), 6);
    let text = table.to_string();
    assert!(text.contains("Ethnic Categories"));
    assert!(text.contains("White"));
    assert!(!text.contains("Black"));
    assert!(text.contains("Totals by Gender/Ethnicity"));
}

#[test]
fn categories_mark_hidden_race() {
    let options = SelectionOptions {
        grants: vec!["G1".to_string()],
        protocols: vec!["P1".to_string(), "P2".to_string()],
    };
    let text = categories_table(&axes(), &options).to_string();
    assert!(text.contains("Black (totals only)"));
    assert!(text.contains("P2"));
    assert!(text.contains("Ethnicity"));
}
