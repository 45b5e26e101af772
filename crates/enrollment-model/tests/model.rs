//! Tests for enrollment-model types.

use chrono::NaiveDate;
use enrollment_model::{
    AggregateResult, AggregateShape, AxisConfiguration, CategoryAxis, Dimension, FilterCriteria,
};

fn axes() -> AxisConfiguration {
    AxisConfiguration::new(
        CategoryAxis::new(Dimension::Race, ["Asian", "Black", "White"]).unwrap(),
        CategoryAxis::new(
            Dimension::Ethnicity,
            ["Not Hispanic or Latino", "Hispanic or Latino"],
        )
        .unwrap(),
        CategoryAxis::new(Dimension::Gender, ["Female", "Male"]).unwrap(),
    )
    .unwrap()
}

#[test]
fn shape_follows_axes() {
    let shape = AggregateShape::of(&axes());
    assert_eq!(shape.races, 3);
    assert_eq!(shape.columns(), 4);
    assert_eq!(shape.cells(), 12);
}

#[test]
fn label_lookup_matches_index_lookup() {
    let axes = axes();
    let mut builder = AggregateResult::builder(AggregateShape::of(&axes));
    builder.record(2, 1, 0);
    let result = builder.finish(1);
    assert_eq!(
        result.cell_by_label(&axes, "White", "Hispanic or Latino", "Female"),
        Some(1)
    );
    assert_eq!(result.cell_by_label(&axes, "white", "Hispanic or Latino", "Female"), None);
}

#[test]
fn criteria_round_trip_through_json() {
    let criteria = FilterCriteria::new(
        ["G1"],
        ["P1", "P2"],
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
    );
    let json = serde_json::to_string(&criteria).expect("serialize criteria");
    assert!(json.contains("\"2022-01-01\""));
    let parsed: FilterCriteria = serde_json::from_str(&json).expect("deserialize criteria");
    assert_eq!(parsed, criteria);
}
