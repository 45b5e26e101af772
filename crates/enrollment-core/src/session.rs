//! Report session: the current-report slot and the update/reset/export actions.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use enrollment_model::{
    AggregateResult, AggregateShape, AxisConfiguration, ExportError, FilterCriteria, Result,
    SelectionOptions,
};
use tracing::{info, info_span, warn};

use crate::aggregate::aggregate;
use crate::export::{default_export_file_name, serialize, write_csv};
use crate::filter::filter_enrollments;
use crate::registry::{AXIS_FIELDS, SELECTION_FIELDS, load, load_selection_options};
use crate::render::{Grid, render, render_into};
use crate::source::RecordSource;

/// Outcome of one successful update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    criteria: FilterCriteria,
    aggregate: AggregateResult,
    record_ids: BTreeSet<String>,
}

impl Report {
    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn aggregate(&self) -> &AggregateResult {
        &self.aggregate
    }

    /// Enrollment record ids that passed the filter.
    #[must_use]
    pub fn record_ids(&self) -> &BTreeSet<String> {
        &self.record_ids
    }

    #[must_use]
    pub fn matched_records(&self) -> usize {
        self.record_ids.len()
    }

    #[must_use]
    pub fn default_file_name(&self) -> String {
        default_export_file_name(self.criteria.start, self.criteria.end)
    }
}

/// Connected session state.
///
/// Axes and selection lists are fixed at connect time. The report slot is
/// overwritten by every successful update and cleared by reset; failed updates
/// leave it as it was.
#[derive(Debug, Clone)]
pub struct ReportSession {
    axes: AxisConfiguration,
    options: SelectionOptions,
    current: Option<Report>,
}

impl ReportSession {
    #[must_use]
    pub fn new(axes: AxisConfiguration, options: SelectionOptions) -> Self {
        Self {
            axes,
            options,
            current: None,
        }
    }

    /// Load axes and selection lists from the source's metadata.
    ///
    /// # Errors
    ///
    /// Returns [`enrollment_model::ReportError::Source`] if the metadata cannot
    /// be fetched and [`enrollment_model::ReportError::Configuration`] if it is
    /// malformed.
    pub fn connect<S: RecordSource + ?Sized>(source: &S) -> Result<Self> {
        let mut fields: Vec<&str> = SELECTION_FIELDS.to_vec();
        fields.extend(AXIS_FIELDS);
        let metadata = source.field_metadata(&fields)?;
        let axes = load(&metadata)?;
        let options = load_selection_options(&metadata)?;
        info!(
            grants = options.grants.len(),
            protocols = options.protocols.len(),
            races = axes.race.len(),
            "connected"
        );
        Ok(Self::new(axes, options))
    }

    #[must_use]
    pub fn axes(&self) -> &AxisConfiguration {
        &self.axes
    }

    #[must_use]
    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    #[must_use]
    pub fn current(&self) -> Option<&Report> {
        self.current.as_ref()
    }

    /// Run the filter and aggregation for `criteria` and store the result.
    ///
    /// When no enrollment matches, participants are not fetched and the stored
    /// aggregate is all zeros.
    ///
    /// # Errors
    ///
    /// Returns [`enrollment_model::ReportError::Validation`] for an inverted
    /// date range and [`enrollment_model::ReportError::Source`] when a fetch
    /// fails. The previous report is kept in both cases.
    pub fn update<S: RecordSource + ?Sized>(
        &mut self,
        source: &S,
        criteria: FilterCriteria,
    ) -> Result<&Report> {
        criteria.validate()?;
        let span = info_span!("update", start = %criteria.start, end = %criteria.end);
        let _guard = span.enter();
        let started = Instant::now();
        self.warn_unknown_selections(&criteria);

        let enrollments = source.enrollments()?;
        let ids = filter_enrollments(&enrollments, &criteria);
        let counts = if ids.is_empty() {
            AggregateResult::zeroed(AggregateShape::of(&self.axes))
        } else {
            let participants = source.participants(&ids)?;
            aggregate(&self.axes, &participants)
        };
        info!(
            enrollments = enrollments.len(),
            matched = ids.len(),
            grand_total = counts.grand_total(),
            duration_ms = started.elapsed().as_millis(),
            "update complete"
        );

        let report = self.current.insert(Report {
            criteria,
            aggregate: counts,
            record_ids: ids,
        });
        Ok(&*report)
    }

    /// Drop the current report and return cleared criteria for `today`.
    pub fn reset(&mut self, today: NaiveDate) -> FilterCriteria {
        self.current = None;
        FilterCriteria::cleared(today)
    }

    /// Render the current report, or an all-zero grid before the first update.
    ///
    /// # Errors
    ///
    /// Propagates [`render`] errors.
    pub fn render(&self) -> Result<Grid> {
        match &self.current {
            Some(report) => render(&report.aggregate, &self.axes),
            None => render(
                &AggregateResult::zeroed(AggregateShape::of(&self.axes)),
                &self.axes,
            ),
        }
    }

    /// Refresh a grid from an earlier [`ReportSession::render`] in place.
    ///
    /// # Errors
    ///
    /// Propagates [`render_into`] errors.
    pub fn render_into(&self, grid: &mut Grid) -> Result<()> {
        match &self.current {
            Some(report) => render_into(grid, &report.aggregate, &self.axes),
            None => render_into(
                grid,
                &AggregateResult::zeroed(AggregateShape::of(&self.axes)),
                &self.axes,
            ),
        }
    }

    /// CSV rows for the current report.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NoReport`] when no update has succeeded since
    /// connect or the last reset.
    pub fn export_rows(&self) -> Result<Vec<Vec<String>>> {
        let report = self.current.as_ref().ok_or(ExportError::NoReport)?;
        serialize(
            &report.aggregate,
            &self.axes,
            &report.criteria.grants,
            &report.criteria.protocols,
        )
    }

    /// Write the current report to `path` as CSV.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NoReport`] without touching the filesystem when
    /// there is nothing to export, or the write error otherwise.
    pub fn export(&self, path: &Path) -> Result<()> {
        let rows = self.export_rows()?;
        write_csv(&rows, path)?;
        Ok(())
    }

    fn warn_unknown_selections(&self, criteria: &FilterCriteria) {
        for grant in &criteria.grants {
            if !self.options.grants.contains(grant) {
                warn!(grant = %grant, "selected grant is not defined in the project");
            }
        }
        for protocol in &criteria.protocols {
            if !self.options.protocols.contains(protocol) {
                warn!(protocol = %protocol, "selected protocol is not defined in the project");
            }
        }
    }
}
