//! Error types for mission validation and detector configuration.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reasons a mission is rejected at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MissionError {
    #[error("drone id must be a non-empty string")]
    EmptyDroneId,

    #[error("mission needs at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("start time {start} must be before end time {end}")]
    InvalidTimeWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("waypoint {index} at {time} is not later than the previous waypoint")]
    NonMonotonicTimes { index: usize, time: DateTime<Utc> },

    #[error("waypoint {index} at {time} lies outside the mission window")]
    WaypointOutsideWindow { index: usize, time: DateTime<Utc> },

    /// Only some waypoints carry a time.
    #[error("waypoints must either all carry a time or all omit it")]
    MixedTiming,

    #[error("waypoint {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),
}

/// Reasons the detector refuses to register a mission.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("invalid mission: {0}")]
    InvalidMission(#[from] MissionError),

    #[error("drone id '{0}' is already registered")]
    DuplicateDroneId(String),
}

/// Invalid detection thresholds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RulesError {
    #[error("safety buffer must be a positive distance, got {0}")]
    NonPositiveBuffer(f64),

    #[error("time threshold must be non-negative, got {0}s")]
    NegativeTimeThreshold(f64),

    #[error("sample step must be a positive duration, got {0}s")]
    NonPositiveStep(f64),
}
