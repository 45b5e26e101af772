//! On-screen grid projection of an aggregate.
//!
//! The grid is a plain matrix of display strings. Where each label and count
//! goes is decided by [`GridLayout`], a pure function of the axes, so a grid
//! rendered once can be refreshed in place with [`render_into`] when the
//! filters change: only count cells are rewritten.
//!
//! Layout, with `stride = genders + 1` (one separator column per ethnicity):
//!
//! ```text
//! row 0   |   | Ethnic Categories
//! row 2   |   |   | <ethnicity 0> ...       | <ethnicity 1> ...
//! row 3   |   |   | F | M | U |   | F | ... | Totals By Race
//! row 4.. | race | counts ...               | row total
//! divider |
//! totals  | Totals by Gender/Ethnicity | column totals | grand | <- Total Enrolled
//! ```
//!
//! Races flagged as not displayed get no row; their counts still reach the
//! screen through the column totals and the grand total.

use enrollment_model::{AggregateResult, AggregateShape, AxisConfiguration, ReportError, Result};

pub const ETHNIC_CATEGORIES_TITLE: &str = "Ethnic Categories";
pub const RACE_TOTALS_HEADER: &str = "Totals By Race";
pub const COLUMN_TOTALS_LABEL: &str = "Totals by Gender/Ethnicity";
pub const GRAND_TOTAL_LABEL: &str = "<- Total Enrolled";

const TITLE_ROW: usize = 0;
const ETHNICITY_ROW: usize = 2;
const GENDER_ROW: usize = 3;
const FIRST_BODY_ROW: usize = 4;
const LABEL_COLUMN: usize = 0;
const FIRST_COUNT_COLUMN: usize = 2;

/// Row/column coordinates of every element of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    stride: usize,
    ethnicities: usize,
    genders: usize,
    /// `race_rows[race]` is the grid row of that race, if it is displayed.
    race_rows: Vec<Option<usize>>,
    displayed_races: usize,
}

impl GridLayout {
    #[must_use]
    pub fn new(axes: &AxisConfiguration) -> Self {
        let mut race_rows = Vec::with_capacity(axes.race.len());
        let mut next_row = FIRST_BODY_ROW;
        for category in axes.race.categories() {
            if category.displayed_as_row {
                race_rows.push(Some(next_row));
                next_row += 1;
            } else {
                race_rows.push(None);
            }
        }
        Self {
            stride: axes.gender.len() + 1,
            ethnicities: axes.ethnicity.len(),
            genders: axes.gender.len(),
            race_rows,
            displayed_races: next_row - FIRST_BODY_ROW,
        }
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.totals_row() + 1, self.trailer_column() + 1)
    }

    #[must_use]
    pub fn separator_column(&self, ethnicity: usize) -> usize {
        1 + ethnicity * self.stride
    }

    #[must_use]
    pub fn ethnicity_column(&self, ethnicity: usize) -> usize {
        FIRST_COUNT_COLUMN + ethnicity * self.stride
    }

    #[must_use]
    pub fn count_column(&self, ethnicity: usize, gender: usize) -> usize {
        self.ethnicity_column(ethnicity) + gender
    }

    #[must_use]
    pub fn race_total_column(&self) -> usize {
        FIRST_COUNT_COLUMN + self.ethnicities * self.stride
    }

    #[must_use]
    pub fn trailer_column(&self) -> usize {
        self.race_total_column() + 1
    }

    /// Grid row for a race, `None` when the race is not displayed.
    #[must_use]
    pub fn race_row(&self, race: usize) -> Option<usize> {
        self.race_rows.get(race).copied().flatten()
    }

    #[must_use]
    pub fn divider_row(&self) -> usize {
        FIRST_BODY_ROW + self.displayed_races
    }

    #[must_use]
    pub fn totals_row(&self) -> usize {
        self.divider_row() + 1
    }

    fn count_columns(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let genders = self.genders;
        (0..self.ethnicities).flat_map(move |e| (0..genders).map(move |g| (e, g)))
    }
}

/// Matrix of display strings, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<String>,
}

impl Grid {
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![String::new(); rows * columns],
        }
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.index(row, column).map(|i| self.cells[i].as_str())
    }

    /// Returns `false` when the coordinate lies outside the grid.
    pub fn set(&mut self, row: usize, column: usize, text: impl Into<String>) -> bool {
        match self.index(row, column) {
            Some(i) => {
                self.cells[i] = text.into();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[String] {
        if row >= self.rows {
            return &[];
        }
        &self.cells[row * self.columns..(row + 1) * self.columns]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[String]> {
        self.cells.chunks(self.columns.max(1)).take(self.rows)
    }

    fn index(&self, row: usize, column: usize) -> Option<usize> {
        (row < self.rows && column < self.columns).then(|| row * self.columns + column)
    }
}

/// Render a fresh grid: labels plus counts.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] when the aggregate was built for
/// different axes.
pub fn render(result: &AggregateResult, axes: &AxisConfiguration) -> Result<Grid> {
    check_shape(result, axes)?;
    let layout = GridLayout::new(axes);
    let (rows, columns) = layout.dimensions();
    let mut grid = Grid::new(rows, columns);
    write_labels(&mut grid, &layout, axes);
    write_counts(&mut grid, &layout, result);
    Ok(grid)
}

/// Refresh the counts of a grid previously rendered for the same axes.
///
/// Structural text (titles, labels) is left untouched.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] when the grid's dimensions do not
/// match the layout of `axes`, or the aggregate was built for other axes.
pub fn render_into(
    grid: &mut Grid,
    result: &AggregateResult,
    axes: &AxisConfiguration,
) -> Result<()> {
    check_shape(result, axes)?;
    let layout = GridLayout::new(axes);
    if grid.dimensions() != layout.dimensions() {
        return Err(ReportError::configuration(
            "grid",
            format!(
                "grid is {:?} but the layout needs {:?}",
                grid.dimensions(),
                layout.dimensions()
            ),
        ));
    }
    write_counts(grid, &layout, result);
    Ok(())
}

fn check_shape(result: &AggregateResult, axes: &AxisConfiguration) -> Result<()> {
    if result.shape() != AggregateShape::of(axes) {
        return Err(ReportError::configuration(
            "aggregate",
            "aggregate was built for different axes",
        ));
    }
    Ok(())
}

fn write_labels(grid: &mut Grid, layout: &GridLayout, axes: &AxisConfiguration) {
    grid.set(TITLE_ROW, 1, ETHNIC_CATEGORIES_TITLE);
    for (ethnicity, label) in axes.ethnicity.labels().enumerate() {
        grid.set(ETHNICITY_ROW, layout.ethnicity_column(ethnicity), label);
        for (gender, gender_label) in axes.gender.labels().enumerate() {
            grid.set(GENDER_ROW, layout.count_column(ethnicity, gender), gender_label);
        }
    }
    grid.set(GENDER_ROW, layout.race_total_column(), RACE_TOTALS_HEADER);
    for (race, label) in axes.race.labels().enumerate() {
        if let Some(row) = layout.race_row(race) {
            grid.set(row, LABEL_COLUMN, label);
        }
    }
    let totals_row = layout.totals_row();
    grid.set(totals_row, LABEL_COLUMN, COLUMN_TOTALS_LABEL);
    grid.set(totals_row, layout.trailer_column(), GRAND_TOTAL_LABEL);
}

fn write_counts(grid: &mut Grid, layout: &GridLayout, result: &AggregateResult) {
    let shape = result.shape();
    let total_column = layout.race_total_column();
    for race in 0..shape.races {
        let Some(row) = layout.race_row(race) else {
            continue;
        };
        for (ethnicity, gender) in layout.count_columns() {
            let count = result.cell(race, ethnicity, gender).unwrap_or_default();
            grid.set(row, layout.count_column(ethnicity, gender), count.to_string());
        }
        let total = result.row_total(race).unwrap_or_default();
        grid.set(row, total_column, total.to_string());
    }
    let totals_row = layout.totals_row();
    for (ethnicity, gender) in layout.count_columns() {
        let total = result.column_total(ethnicity, gender).unwrap_or_default();
        grid.set(
            totals_row,
            layout.count_column(ethnicity, gender),
            total.to_string(),
        );
    }
    grid.set(totals_row, total_column, result.grand_total().to_string());
}
