//! Report selection: which grants, protocols and dates are in scope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Grant/protocol/date-range selection for one report update.
///
/// Grants and protocols keep the order the user picked them in, since the CSV
/// export echoes them back; membership checks ignore that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub grants: Vec<String>,
    pub protocols: Vec<String>,
    /// Inclusive lower bound.
    pub start: NaiveDate,
    /// Inclusive upper bound.
    pub end: NaiveDate,
}

impl FilterCriteria {
    /// Build criteria, dropping repeated selections while keeping first-seen order.
    #[must_use]
    pub fn new<G, P>(grants: G, protocols: P, start: NaiveDate, end: NaiveDate) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            grants: dedup(grants),
            protocols: dedup(protocols),
            start,
            end,
        }
    }

    /// Criteria after a reset: nothing selected, both dates on `today`.
    #[must_use]
    pub fn cleared(today: NaiveDate) -> Self {
        Self {
            grants: Vec::new(),
            protocols: Vec::new(),
            start: today,
            end: today,
        }
    }

    /// Check the date range.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Validation`] when `start` is after `end`.
    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(ReportError::Validation {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn has_grant(&self, grant: &str) -> bool {
        self.grants.iter().any(|g| g == grant)
    }

    #[must_use]
    pub fn has_protocol(&self, protocol: &str) -> bool {
        self.protocols.iter().any(|p| p == protocol)
    }

    /// Inclusive on both bounds.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.grants.is_empty() && !self.protocols.is_empty()
    }
}

/// Grant and protocol labels offered for selection, in metadata order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptions {
    pub grants: Vec<String>,
    pub protocols: Vec<String>,
}

fn dedup<I>(values: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.into();
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
