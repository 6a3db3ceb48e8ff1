//! Trajectory sampling and point-in-time position queries.
//!
//! Positions between waypoints are linearly interpolated by elapsed-time
//! fraction. Queries outside the waypoint times clamp to the first or last
//! waypoint position instead of extrapolating.

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::RulesError;
use crate::models::{seconds_between, Mission, Position, Waypoint};

/// Positive sampling interval, at microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SampleStep {
    micros: i64,
}

impl Default for SampleStep {
    /// One second.
    fn default() -> Self {
        Self { micros: 1_000_000 }
    }
}

impl SampleStep {
    pub fn new(step: TimeDelta) -> Result<Self, RulesError> {
        match step.num_microseconds() {
            Some(micros) if micros > 0 => Ok(Self { micros }),
            _ => Err(RulesError::NonPositiveStep(
                step.num_milliseconds() as f64 / 1_000.0,
            )),
        }
    }

    pub fn from_secs(secs: f64) -> Result<Self, RulesError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(RulesError::NonPositiveStep(secs));
        }
        let micros = (secs * 1_000_000.0).round() as i64;
        if micros <= 0 {
            return Err(RulesError::NonPositiveStep(secs));
        }
        Ok(Self { micros })
    }

    pub fn as_delta(&self) -> TimeDelta {
        TimeDelta::microseconds(self.micros)
    }

    pub fn as_secs(&self) -> f64 {
        self.micros as f64 / 1_000_000.0
    }
}

/// Sample `mission` every `step` from start to end time, both included.
///
/// Produces `ceil(duration / step) + 1` points; the last one always sits
/// exactly on the end time even when the duration is not a multiple of `step`.
pub fn sample(mission: &Mission, step: SampleStep) -> Vec<Waypoint> {
    let waypoints = mission.waypoints();
    let start = mission.start_time();
    let end = mission.end_time();

    let mut samples = Vec::with_capacity(expected_len(mission, step));
    let mut cursor = 0usize;
    let mut k: i64 = 0;

    loop {
        let offset = TimeDelta::microseconds(step.micros.saturating_mul(k));
        let time = match start.checked_add_signed(offset) {
            Some(time) if time < end => time,
            _ => break,
        };
        while cursor < waypoints.len() && waypoints[cursor].time <= time {
            cursor += 1;
        }
        samples.push(Waypoint::at(position_after(waypoints, cursor, time), time));
        k += 1;
    }

    samples.push(Waypoint::at(position_after(waypoints, waypoints.len(), end), end));
    samples
}

/// Position of `mission` at `time`, clamped to the first/last waypoint
/// outside the waypoint times. The result is tagged with `time`.
pub fn position_at(mission: &Mission, time: DateTime<Utc>) -> Waypoint {
    let waypoints = mission.waypoints();
    let index = waypoints.partition_point(|wp| wp.time <= time);
    Waypoint::at(position_after(waypoints, index, time), time)
}

/// Interpolate over an arbitrary time-ordered waypoint slice.
///
/// Unlike a [`Mission`], the slice may contain waypoints sharing a timestamp;
/// a query exactly at that instant yields the later waypoint's position.
pub fn interpolate(waypoints: &[Waypoint], time: DateTime<Utc>) -> Option<Waypoint> {
    if waypoints.is_empty() {
        return None;
    }
    let index = waypoints.partition_point(|wp| wp.time <= time);
    Some(Waypoint::at(position_after(waypoints, index, time), time))
}

/// `index` counts the waypoints timed at or before `time`, so the bracketing
/// segment is `[index - 1, index]` and always has a positive duration.
fn position_after(waypoints: &[Waypoint], index: usize, time: DateTime<Utc>) -> Position {
    if index == 0 {
        return waypoints[0].position();
    }
    if index >= waypoints.len() {
        return waypoints[waypoints.len() - 1].position();
    }

    let prev = &waypoints[index - 1];
    let next = &waypoints[index];
    let span = seconds_between(prev.time, next.time);
    if span <= 0.0 {
        return next.position();
    }

    let alpha = (seconds_between(prev.time, time) / span).clamp(0.0, 1.0);
    prev.position().lerp(&next.position(), alpha)
}

fn expected_len(mission: &Mission, step: SampleStep) -> usize {
    let duration_us = mission.duration().num_microseconds().unwrap_or(i64::MAX);
    let steps = duration_us / step.micros + i64::from(duration_us % step.micros != 0);
    usize::try_from(steps).map(|n| n + 1).unwrap_or(1).min(1 << 20)
}
