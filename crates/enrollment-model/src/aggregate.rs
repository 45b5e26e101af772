//! Cross-tabulated counts for one report update.

use serde::{Deserialize, Serialize};

use crate::axis::AxisConfiguration;

/// Dimensions of a cross-tabulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateShape {
    pub races: usize,
    pub ethnicities: usize,
    pub genders: usize,
}

impl AggregateShape {
    #[must_use]
    pub fn of(axes: &AxisConfiguration) -> Self {
        Self {
            races: axes.race.len(),
            ethnicities: axes.ethnicity.len(),
            genders: axes.gender.len(),
        }
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.ethnicities * self.genders
    }

    #[must_use]
    pub fn cells(&self) -> usize {
        self.races * self.columns()
    }

    fn column_index(&self, ethnicity: usize, gender: usize) -> Option<usize> {
        (ethnicity < self.ethnicities && gender < self.genders)
            .then(|| ethnicity * self.genders + gender)
    }

    fn cell_index(&self, race: usize, ethnicity: usize, gender: usize) -> Option<usize> {
        if race >= self.races {
            return None;
        }
        self.column_index(ethnicity, gender)
            .map(|column| race * self.columns() + column)
    }
}

/// Counts per (race, ethnicity, gender) with derived totals.
///
/// Immutable once built. The grand total is the number of participants that
/// went in, which can exceed the sum of the cells when some participants carry
/// labels outside the configured axes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    shape: AggregateShape,
    cells: Vec<usize>,
    row_totals: Vec<usize>,
    column_totals: Vec<usize>,
    grand_total: usize,
}

impl AggregateResult {
    /// A result with every count at zero, shaped like a populated one.
    #[must_use]
    pub fn zeroed(shape: AggregateShape) -> Self {
        AggregateBuilder::new(shape).finish(0)
    }

    #[must_use]
    pub fn builder(shape: AggregateShape) -> AggregateBuilder {
        AggregateBuilder::new(shape)
    }

    #[must_use]
    pub fn shape(&self) -> AggregateShape {
        self.shape
    }

    #[must_use]
    pub fn cell(&self, race: usize, ethnicity: usize, gender: usize) -> Option<usize> {
        self.shape
            .cell_index(race, ethnicity, gender)
            .map(|index| self.cells[index])
    }

    /// Cell lookup by exact label.
    #[must_use]
    pub fn cell_by_label(
        &self,
        axes: &AxisConfiguration,
        race: &str,
        ethnicity: &str,
        gender: &str,
    ) -> Option<usize> {
        self.cell(
            axes.race.index_of(race)?,
            axes.ethnicity.index_of(ethnicity)?,
            axes.gender.index_of(gender)?,
        )
    }

    #[must_use]
    pub fn row_total(&self, race: usize) -> Option<usize> {
        self.row_totals.get(race).copied()
    }

    #[must_use]
    pub fn column_total(&self, ethnicity: usize, gender: usize) -> Option<usize> {
        self.shape
            .column_index(ethnicity, gender)
            .map(|index| self.column_totals[index])
    }

    #[must_use]
    pub fn row_totals(&self) -> &[usize] {
        &self.row_totals
    }

    /// Column totals in nested (ethnicity, gender) order.
    #[must_use]
    pub fn column_totals(&self) -> &[usize] {
        &self.column_totals
    }

    /// Counts of one race row in nested (ethnicity, gender) order.
    #[must_use]
    pub fn row(&self, race: usize) -> &[usize] {
        let columns = self.shape.columns();
        if race >= self.shape.races {
            return &[];
        }
        &self.cells[race * columns..(race + 1) * columns]
    }

    #[must_use]
    pub fn grand_total(&self) -> usize {
        self.grand_total
    }

    /// Sum over all cells; equals the grand total only when every participant
    /// matched a configured label.
    #[must_use]
    pub fn matched_total(&self) -> usize {
        self.cells.iter().sum()
    }
}

/// Accumulates counts into an [`AggregateResult`].
#[derive(Debug, Clone)]
pub struct AggregateBuilder {
    shape: AggregateShape,
    cells: Vec<usize>,
    row_totals: Vec<usize>,
    column_totals: Vec<usize>,
}

impl AggregateBuilder {
    fn new(shape: AggregateShape) -> Self {
        Self {
            shape,
            cells: vec![0; shape.cells()],
            row_totals: vec![0; shape.races],
            column_totals: vec![0; shape.columns()],
        }
    }

    /// Count one match into its cell, row total and column total.
    ///
    /// Returns `false` (and counts nothing) for out-of-range indices.
    pub fn record(&mut self, race: usize, ethnicity: usize, gender: usize) -> bool {
        let (Some(cell), Some(column)) = (
            self.shape.cell_index(race, ethnicity, gender),
            self.shape.column_index(ethnicity, gender),
        ) else {
            return false;
        };
        self.cells[cell] += 1;
        self.row_totals[race] += 1;
        self.column_totals[column] += 1;
        true
    }

    #[must_use]
    pub fn finish(self, grand_total: usize) -> AggregateResult {
        AggregateResult {
            shape: self.shape,
            cells: self.cells,
            row_totals: self.row_totals,
            column_totals: self.column_totals,
            grand_total,
        }
    }
}
