//! Enrollment filter: record ids inside a grant/protocol/date selection.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use enrollment_model::{EnrollmentRecord, FilterCriteria};
use tracing::debug;

const ENROLLMENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO `YYYY-MM-DD` enrollment date.
#[must_use]
pub fn parse_enrollment_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), ENROLLMENT_DATE_FORMAT).ok()
}

/// Ids of the enrollments that fall inside `criteria`.
///
/// A record needs a grant, a protocol and an enrollment date to be considered
/// at all. Grant and protocol must be among the selected ones and the date
/// must lie within `start..=end`. A record whose date does not parse is
/// skipped on its own. An empty grant or protocol selection matches nothing.
#[must_use]
pub fn filter_enrollments(
    enrollments: &[EnrollmentRecord],
    criteria: &FilterCriteria,
) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    if !criteria.has_selection() {
        return ids;
    }
    let mut incomplete = 0usize;
    let mut malformed = 0usize;
    for record in enrollments {
        let (Some(grant), Some(protocol), Some(raw_date)) = (
            record.grant.as_deref(),
            record.protocol.as_deref(),
            record.enrollment_date.as_deref(),
        ) else {
            incomplete += 1;
            continue;
        };
        if !criteria.has_grant(grant) || !criteria.has_protocol(protocol) {
            continue;
        }
        let Some(date) = parse_enrollment_date(raw_date) else {
            malformed += 1;
            continue;
        };
        if criteria.covers(date) {
            ids.insert(record.record_id.clone());
        }
    }
    debug!(
        considered = enrollments.len(),
        matched = ids.len(),
        incomplete,
        malformed,
        "filtered enrollments"
    );
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn enrollment(id: &str, grant: &str, protocol: &str, date: &str) -> EnrollmentRecord {
        EnrollmentRecord::new(
            id,
            Some(grant.to_string()),
            Some(protocol.to_string()),
            Some(date.to_string()),
        )
    }

    fn january() -> FilterCriteria {
        FilterCriteria::new(["G1"], ["P1"], date(2022, 1, 1), date(2022, 1, 31))
    }

    #[test]
    fn single_match() {
        let ids = filter_enrollments(&[enrollment("1", "G1", "P1", "2022-01-05")], &january());
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn missing_fields_excluded() {
        let records = vec![
            EnrollmentRecord::new("1", None, Some("P1".into()), Some("2022-01-05".into())),
            EnrollmentRecord::new("2", Some("G1".into()), None, Some("2022-01-05".into())),
            EnrollmentRecord::new("3", Some("G1".into()), Some("P1".into()), None),
            EnrollmentRecord::new("4", Some("".into()), Some("P1".into()), Some("2022-01-05".into())),
        ];
        assert!(filter_enrollments(&records, &january()).is_empty());
    }

    #[test]
    fn malformed_date_skips_only_that_record() {
        let records = vec![
            enrollment("1", "G1", "P1", "05/01/2022"),
            enrollment("2", "G1", "P1", "2022-01-06"),
            enrollment("3", "G1", "P1", "2022-13-40"),
        ];
        let ids = filter_enrollments(&records, &january());
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["2"]);
    }

    #[test]
    fn unselected_grant_or_protocol_excluded() {
        let records = vec![
            enrollment("1", "G2", "P1", "2022-01-05"),
            enrollment("2", "G1", "P2", "2022-01-05"),
        ];
        assert!(filter_enrollments(&records, &january()).is_empty());
    }

    #[test]
    fn repeated_record_id_collapses() {
        let records = vec![
            enrollment("7", "G1", "P1", "2022-01-05"),
            enrollment("7", "G1", "P1", "2022-01-20"),
        ];
        assert_eq!(filter_enrollments(&records, &january()).len(), 1);
    }

    #[test]
    fn surrounding_whitespace_in_date_tolerated() {
        assert_eq!(parse_enrollment_date(" 2022-01-05 "), Some(date(2022, 1, 5)));
        assert_eq!(parse_enrollment_date(""), None);
    }
}
