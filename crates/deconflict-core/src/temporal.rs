//! Temporal confirmation of spatial candidates.

use chrono::TimeDelta;

use crate::models::{seconds_between, Conflict, Mission};
use crate::spatial::CandidatePair;
use crate::trajectory::position_at;

/// Confirm a candidate pair as a real conflict.
///
/// Exact positions are re-derived from each mission at the candidate's own
/// sample time. The pair is a conflict when those positions are within
/// `buffer` and their times within `time_threshold` of each other. `None`
/// means "no conflict at this candidate".
pub fn verify(
    mission_a: &Mission,
    mission_b: &Mission,
    candidate: &CandidatePair,
    buffer: f64,
    time_threshold: TimeDelta,
) -> Option<Conflict> {
    let exact_a = position_at(mission_a, candidate.first.time);
    let exact_b = position_at(mission_b, candidate.second.time);

    let separation = exact_a.distance_to(&exact_b);
    if separation > buffer {
        return None;
    }

    let gap = (exact_a.time - exact_b.time).abs();
    if gap > time_threshold {
        return None;
    }

    Some(Conflict::new(
        exact_a.position().midpoint(&exact_b.position()),
        exact_a.time.max(exact_b.time),
        mission_a.drone_id(),
        mission_b.drone_id(),
        separation,
        seconds_between(exact_b.time, exact_a.time).abs(),
    ))
}
