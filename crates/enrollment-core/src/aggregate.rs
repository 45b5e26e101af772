//! Cross-tabulation of participants by race × ethnicity × gender.

use enrollment_model::{AggregateResult, AggregateShape, AxisConfiguration, ParticipantRecord};
use tracing::debug;

/// Count participants into the race × (ethnicity × gender) grid.
///
/// Every race takes part, including the one hidden from the on-screen rows.
/// A participant whose race, ethnicity or gender does not exactly match a
/// configured label lands in no cell, but the grand total is always the number
/// of participants passed in. An empty slice yields the all-zero result.
#[must_use]
pub fn aggregate(axes: &AxisConfiguration, participants: &[ParticipantRecord]) -> AggregateResult {
    let mut builder = AggregateResult::builder(AggregateShape::of(axes));
    let mut unmatched = 0usize;
    for participant in participants {
        let indices = (
            axes.race.index_of(&participant.race),
            axes.ethnicity.index_of(&participant.ethnicity),
            axes.gender.index_of(&participant.gender),
        );
        match indices {
            (Some(race), Some(ethnicity), Some(gender)) => {
                builder.record(race, ethnicity, gender);
            }
            _ => unmatched += 1,
        }
    }
    if unmatched > 0 {
        debug!(
            unmatched,
            total = participants.len(),
            "participants with labels outside the configured axes"
        );
    }
    builder.finish(participants.len())
}
