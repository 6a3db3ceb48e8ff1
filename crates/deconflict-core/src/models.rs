//! Core data models for mission deconfliction.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::MissionError;

/// A point in 3-D space, in the same units as the safety buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(&self, other: &Position) -> Position {
        Position {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
            z: (self.z + other.z) / 2.0,
        }
    }

    /// Linear interpolation, `alpha` = 0 at `self`, 1 at `other`.
    pub fn lerp(&self, other: &Position, alpha: f64) -> Position {
        Position {
            x: self.x + alpha * (other.x - self.x),
            y: self.y + alpha * (other.y - self.y),
            z: self.z + alpha * (other.z - self.z),
        }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// A position tagged with the absolute time the drone is planned to be there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    pub time: DateTime<Utc>,
}

impl Waypoint {
    pub fn new(x: f64, y: f64, z: f64, time: DateTime<Utc>) -> Self {
        Self { x, y, z, time }
    }

    pub fn at(position: Position, time: DateTime<Utc>) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            time,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    /// Spatial distance; times are ignored.
    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        self.position().distance_to(&other.position())
    }
}

/// Waypoints supplied when building a mission.
///
/// Timing is all-or-nothing: either every waypoint has its planned time, or
/// none does and times are distributed across the mission window.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionWaypoints {
    Timed(Vec<Waypoint>),
    Untimed(Vec<Position>),
}

/// A drone's planned flight: ordered, timed waypoints inside a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MissionRecord", into = "MissionRecord")]
pub struct Mission {
    drone_id: String,
    waypoints: Vec<Waypoint>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
}

impl Mission {
    /// Build a validated mission. Untimed waypoints get their times here and
    /// nowhere else.
    pub fn new(
        drone_id: impl Into<String>,
        waypoints: MissionWaypoints,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, MissionError> {
        let drone_id = drone_id.into();
        if drone_id.trim().is_empty() {
            return Err(MissionError::EmptyDroneId);
        }
        if start_time >= end_time {
            return Err(MissionError::InvalidTimeWindow {
                start: start_time,
                end: end_time,
            });
        }

        let waypoints = match waypoints {
            MissionWaypoints::Timed(waypoints) => waypoints,
            MissionWaypoints::Untimed(positions) => {
                if positions.len() < 2 {
                    return Err(MissionError::TooFewWaypoints(positions.len()));
                }
                if let Some(index) = positions.iter().position(|p| !p.is_finite()) {
                    return Err(MissionError::NonFiniteCoordinate(index));
                }
                assign_times(&positions, start_time, end_time)
            }
        };

        let mission = Self {
            drone_id,
            waypoints,
            start_time,
            end_time,
        };
        mission.validate()?;
        Ok(mission)
    }

    /// Convenience constructor for fully timed waypoints whose window is
    /// exactly the first and last waypoint times.
    pub fn from_timed(
        drone_id: impl Into<String>,
        waypoints: Vec<Waypoint>,
    ) -> Result<Self, MissionError> {
        let (start, end) = match waypoints.as_slice() {
            [first, .., last] => (first.time, last.time),
            _ => return Err(MissionError::TooFewWaypoints(waypoints.len())),
        };
        Self::new(drone_id, MissionWaypoints::Timed(waypoints), start, end)
    }

    /// Check every mission invariant.
    pub fn validate(&self) -> Result<(), MissionError> {
        if self.drone_id.trim().is_empty() {
            return Err(MissionError::EmptyDroneId);
        }
        if self.waypoints.len() < 2 {
            return Err(MissionError::TooFewWaypoints(self.waypoints.len()));
        }
        if self.start_time >= self.end_time {
            return Err(MissionError::InvalidTimeWindow {
                start: self.start_time,
                end: self.end_time,
            });
        }

        for (index, wp) in self.waypoints.iter().enumerate() {
            if !wp.position().is_finite() {
                return Err(MissionError::NonFiniteCoordinate(index));
            }
            if wp.time < self.start_time || wp.time > self.end_time {
                return Err(MissionError::WaypointOutsideWindow {
                    index,
                    time: wp.time,
                });
            }
            if index > 0 && wp.time <= self.waypoints[index - 1].time {
                return Err(MissionError::NonMonotonicTimes {
                    index,
                    time: wp.time,
                });
            }
        }

        Ok(())
    }

    pub fn drone_id(&self) -> &str {
        &self.drone_id
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    /// First waypoint. Missions always hold at least two.
    pub fn first(&self) -> &Waypoint {
        &self.waypoints[0]
    }

    pub fn last(&self) -> &Waypoint {
        &self.waypoints[self.waypoints.len() - 1]
    }

    /// Total length of the polyline through all waypoints.
    pub fn path_length(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }
}

/// Distribute times across `[start, end]` in proportion to cumulative path
/// length. A path of zero total length is spaced evenly in time.
pub fn assign_times(
    positions: &[Position],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Waypoint> {
    let total_secs = seconds_between(start, end);
    let segment_count = positions.len().saturating_sub(1).max(1) as f64;
    let total_length: f64 = positions
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum();

    let mut covered = 0.0;
    let mut waypoints: Vec<Waypoint> = positions
        .iter()
        .enumerate()
        .map(|(i, position)| {
            if i > 0 {
                covered += positions[i - 1].distance_to(position);
            }
            let fraction = if total_length > 0.0 {
                covered / total_length
            } else {
                i as f64 / segment_count
            };
            Waypoint::at(*position, offset_by_seconds(start, total_secs * fraction))
        })
        .collect();

    if let Some(last) = waypoints.last_mut() {
        last.time = end;
    }
    waypoints
}

/// Signed seconds from `from` to `to`, at microsecond resolution.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

/// `time` shifted by a fractional number of seconds, rounded to the microsecond.
pub fn offset_by_seconds(time: DateTime<Utc>, secs: f64) -> DateTime<Utc> {
    time + TimeDelta::microseconds((secs * 1_000_000.0).round() as i64)
}

/// Wire form of a mission. Waypoint times are optional so that untimed plans
/// can be loaded; conversion into [`Mission`] validates everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MissionRecord {
    drone_id: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    waypoints: Vec<WaypointRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WaypointRecord {
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<DateTime<Utc>>,
}

impl TryFrom<MissionRecord> for Mission {
    type Error = MissionError;

    fn try_from(record: MissionRecord) -> Result<Self, Self::Error> {
        let timed = record.waypoints.iter().filter(|wp| wp.time.is_some()).count();
        let waypoints = if timed == record.waypoints.len() {
            MissionWaypoints::Timed(
                record
                    .waypoints
                    .iter()
                    .filter_map(|wp| wp.time.map(|time| Waypoint::new(wp.x, wp.y, wp.z, time)))
                    .collect(),
            )
        } else if timed == 0 {
            MissionWaypoints::Untimed(
                record
                    .waypoints
                    .iter()
                    .map(|wp| Position::new(wp.x, wp.y, wp.z))
                    .collect(),
            )
        } else {
            return Err(MissionError::MixedTiming);
        };

        Mission::new(record.drone_id, waypoints, record.start_time, record.end_time)
    }
}

impl From<Mission> for MissionRecord {
    fn from(mission: Mission) -> Self {
        Self {
            drone_id: mission.drone_id,
            start_time: mission.start_time,
            end_time: mission.end_time,
            waypoints: mission
                .waypoints
                .into_iter()
                .map(|wp| WaypointRecord {
                    x: wp.x,
                    y: wp.y,
                    z: wp.z,
                    time: Some(wp.time),
                })
                .collect(),
        }
    }
}

/// Confirmed spatio-temporal proximity breach between drones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    /// Midpoint between the two drones, timed at the conflict time
    location: Waypoint,
    time: DateTime<Utc>,
    drone_ids: BTreeSet<String>,
    /// Distance between the two exact positions
    separation: f64,
    /// Seconds between the two exact positions' times
    time_gap_secs: f64,
    description: String,
}

impl Conflict {
    pub(crate) fn new(
        location: Position,
        time: DateTime<Utc>,
        drone_a: &str,
        drone_b: &str,
        separation: f64,
        time_gap_secs: f64,
    ) -> Self {
        let description = format!(
            "Spatio-temporal conflict between {} and {} at {} at {} (separation {:.2}, time gap {:.1}s)",
            drone_a,
            drone_b,
            location,
            time.format("%H:%M:%S"),
            separation,
            time_gap_secs
        );
        Self {
            location: Waypoint::at(location, time),
            time,
            drone_ids: [drone_a.to_string(), drone_b.to_string()].into(),
            separation,
            time_gap_secs,
            description,
        }
    }

    pub fn location(&self) -> &Waypoint {
        &self.location
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn drone_ids(&self) -> &BTreeSet<String> {
        &self.drone_ids
    }

    pub fn involves(&self, drone_id: &str) -> bool {
        self.drone_ids.contains(drone_id)
    }

    pub fn separation(&self) -> f64 {
        self.separation
    }

    pub fn time_gap_secs(&self) -> f64 {
        self.time_gap_secs
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}
