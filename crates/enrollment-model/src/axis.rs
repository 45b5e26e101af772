//! Report axes: the ordered Race, Ethnicity and Gender category lists.
//!
//! Axis order decides row and column order in every rendered table and CSV
//! export, so labels are kept exactly in the order the metadata lists them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::records::{FIELD_ETHNICITY, FIELD_GENDER, FIELD_RACE};

/// Race label that is counted into totals but never given its own row on screen.
pub const HIDDEN_RACE_LABEL: &str = "Black";

/// One of the three demographic dimensions of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Race,
    Ethnicity,
    Gender,
}

impl Dimension {
    /// Metadata field that carries this dimension's choice list.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Race => FIELD_RACE,
            Self::Ethnicity => FIELD_ETHNICITY,
            Self::Gender => FIELD_GENDER,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Race => "Race",
            Self::Ethnicity => "Ethnicity",
            Self::Gender => "Gender",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single category label on an axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub label: String,
    /// Whether the category gets its own row in the on-screen grid.
    /// Only meaningful on the race axis.
    pub displayed_as_row: bool,
}

/// Ordered, duplicate-free list of categories for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAxis {
    dimension: Dimension,
    categories: Vec<Category>,
}

impl CategoryAxis {
    /// Build an axis from labels in display order.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] if the list is empty, a label is
    /// blank, or a label appears twice.
    pub fn new<I, S>(dimension: Dimension, labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let mut categories = Vec::new();
        for label in labels {
            let label: String = label.into();
            if label.trim().is_empty() {
                return Err(ReportError::configuration(
                    dimension.field_name(),
                    "empty category label",
                ));
            }
            if !seen.insert(label.clone()) {
                return Err(ReportError::configuration(
                    dimension.field_name(),
                    format!(
                        "duplicate category label '{label}'; each label must name a single \
                         report row or column"
                    ),
                ));
            }
            let displayed_as_row = !(dimension == Dimension::Race && label == HIDDEN_RACE_LABEL);
            categories.push(Category {
                label,
                displayed_as_row,
            });
        }
        if categories.is_empty() {
            return Err(ReportError::configuration(
                dimension.field_name(),
                "no categories defined",
            ));
        }
        Ok(Self {
            dimension,
            categories,
        })
    }

    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.label.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Position of an exact (case-sensitive) label match.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|category| category.label == label)
    }

    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.categories
            .get(index)
            .map(|category| category.label.as_str())
    }

    /// Indices of the categories that get their own on-screen row, in order.
    pub fn displayed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.categories
            .iter()
            .enumerate()
            .filter(|(_, category)| category.displayed_as_row)
            .map(|(index, _)| index)
    }
}

/// The three report axes, produced once per connection and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConfiguration {
    pub race: CategoryAxis,
    pub ethnicity: CategoryAxis,
    pub gender: CategoryAxis,
}

impl AxisConfiguration {
    /// Assemble the configuration, checking each axis sits on its own dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] when an axis is passed in the
    /// wrong position.
    pub fn new(race: CategoryAxis, ethnicity: CategoryAxis, gender: CategoryAxis) -> Result<Self> {
        for (axis, expected) in [
            (&race, Dimension::Race),
            (&ethnicity, Dimension::Ethnicity),
            (&gender, Dimension::Gender),
        ] {
            if axis.dimension() != expected {
                return Err(ReportError::configuration(
                    expected.field_name(),
                    format!("expected {expected} axis, found {}", axis.dimension()),
                ));
            }
        }
        Ok(Self {
            race,
            ethnicity,
            gender,
        })
    }

    #[must_use]
    pub fn axis(&self, dimension: Dimension) -> &CategoryAxis {
        match dimension {
            Dimension::Race => &self.race,
            Dimension::Ethnicity => &self.ethnicity,
            Dimension::Gender => &self.gender,
        }
    }

    /// Number of (ethnicity, gender) columns in the cross-tabulation.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.ethnicity.len() * self.gender.len()
    }

    /// `(ethnicity, gender)` index pairs in nested column order.
    pub fn column_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let genders = self.gender.len();
        (0..self.ethnicity.len())
            .flat_map(move |ethnicity| (0..genders).map(move |gender| (ethnicity, gender)))
    }
}
