//! Spatial candidate discovery between two sampled trajectories.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::models::Waypoint;

/// Two sample points, one per trajectory, that are spatially close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidatePair {
    pub first: Waypoint,
    pub second: Waypoint,
    pub distance: f64,
}

/// Euclidean 3-D distance between two waypoints. Times are ignored.
pub fn distance(a: &Waypoint, b: &Waypoint) -> f64 {
    a.distance_to(b)
}

/// Find sample pairs within `buffer` of each other.
///
/// Only points whose sample times differ by at most `window` are compared.
/// Both trajectories must be time-ordered (as produced by
/// [`crate::trajectory::sample`]); the scan keeps a sliding window over
/// `traj_b`, so the cost grows with the number of samples times the samples
/// per window rather than with the full cross product.
///
/// Results are ordered by position in `traj_a`, then in `traj_b`.
pub fn find_candidates(
    traj_a: &[Waypoint],
    traj_b: &[Waypoint],
    buffer: f64,
    window: TimeDelta,
) -> Vec<CandidatePair> {
    let mut candidates = Vec::new();
    let mut lower = 0usize;

    for a in traj_a {
        let earliest = a
            .time
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let latest = a
            .time
            .checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        while lower < traj_b.len() && traj_b[lower].time < earliest {
            lower += 1;
        }

        for b in traj_b[lower..].iter().take_while(|b| b.time <= latest) {
            let d = distance(a, b);
            if d <= buffer {
                candidates.push(CandidatePair {
                    first: *a,
                    second: *b,
                    distance: d,
                });
            }
        }
    }

    candidates
}
