//! Category registry: report axes and selection lists from field metadata.
//!
//! Choice lists arrive as `code, label | code, label | ...`. The code is
//! dropped and the label kept, in source order. The split happens at the first
//! comma, so labels may themselves contain commas.

use enrollment_model::{
    AxisConfiguration, CategoryAxis, Dimension, FIELD_GRANT, FIELD_PROTOCOL, FieldMetadata,
    ReportError, Result, SelectionOptions,
};
use tracing::debug;

/// Metadata fields needed to build the axes.
pub const AXIS_FIELDS: [&str; 3] = [
    Dimension::Race.field_name(),
    Dimension::Ethnicity.field_name(),
    Dimension::Gender.field_name(),
];

/// Metadata fields needed to populate the selection lists.
pub const SELECTION_FIELDS: [&str; 2] = [FIELD_GRANT, FIELD_PROTOCOL];

/// Build the race, ethnicity and gender axes.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] if a field is missing, a choice entry
/// has no `code, label` delimiter, or an axis ends up empty or with repeated
/// labels.
pub fn load(metadata: &[FieldMetadata]) -> Result<AxisConfiguration> {
    let race = load_axis(metadata, Dimension::Race)?;
    let ethnicity = load_axis(metadata, Dimension::Ethnicity)?;
    let gender = load_axis(metadata, Dimension::Gender)?;
    debug!(
        races = race.len(),
        ethnicities = ethnicity.len(),
        genders = gender.len(),
        "loaded report axes"
    );
    AxisConfiguration::new(race, ethnicity, gender)
}

/// Grant and protocol labels offered for selection.
///
/// # Errors
///
/// Same conditions as [`load`], applied to the `grant` and `protocol` fields.
pub fn load_selection_options(metadata: &[FieldMetadata]) -> Result<SelectionOptions> {
    Ok(SelectionOptions {
        grants: choice_labels(find_field(metadata, FIELD_GRANT)?)?,
        protocols: choice_labels(find_field(metadata, FIELD_PROTOCOL)?)?,
    })
}

fn load_axis(metadata: &[FieldMetadata], dimension: Dimension) -> Result<CategoryAxis> {
    let field = find_field(metadata, dimension.field_name())?;
    CategoryAxis::new(dimension, choice_labels(field)?)
}

fn find_field<'a>(metadata: &'a [FieldMetadata], name: &str) -> Result<&'a FieldMetadata> {
    metadata
        .iter()
        .find(|field| field.field_name == name)
        .ok_or_else(|| ReportError::configuration(name, "field not found in project metadata"))
}

/// Labels of a field's choice list, in order.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] for an empty list, an entry without
/// a comma, or an entry with an empty label.
pub fn choice_labels(field: &FieldMetadata) -> Result<Vec<String>> {
    let raw = field.select_choices_or_calculations.trim();
    if raw.is_empty() {
        return Err(ReportError::configuration(
            &field.field_name,
            "field has no choices",
        ));
    }
    raw.split('|')
        .map(|entry| {
            let Some((_code, label)) = entry.split_once(',') else {
                return Err(ReportError::configuration(
                    &field.field_name,
                    format!("choice '{}' is not of the form 'code, label'", entry.trim()),
                ));
            };
            let label = label.trim();
            if label.is_empty() {
                return Err(ReportError::configuration(
                    &field.field_name,
                    format!("choice '{}' has an empty label", entry.trim()),
                ));
            }
            Ok(label.to_string())
        })
        .collect()
}
