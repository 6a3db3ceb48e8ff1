//! Pre-defined mission scenarios for demonstration and testing.

use chrono::{DateTime, TimeDelta, Utc};
use clap::ValueEnum;
use deconflict_core::{
    ConflictDetector, DetectionReport, DetectionRules, Mission, MissionError, Waypoint,
};

use crate::loader::build_detector;

/// Available built-in scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    /// Parallel flight plus a crossing long after the primary has landed
    ConflictFree,
    /// Two drones on diagonals meeting mid-route
    DirectConflict,
    /// Climbing primary meets a level drone at altitude
    ThreeDConflict,
    /// Slow eastbound drone crossed by a fast northbound one
    Crossing,
}

/// A primary mission to verify against a set of other planned missions.
pub struct Scenario {
    pub name: String,
    pub primary: Mission,
    pub others: Vec<Mission>,
}

impl Scenario {
    /// Build a scenario whose times are offsets from `base`.
    pub fn build(kind: ScenarioKind, base: DateTime<Utc>) -> Result<Self, MissionError> {
        match kind {
            ScenarioKind::ConflictFree => conflict_free(base),
            ScenarioKind::DirectConflict => direct_conflict(base),
            ScenarioKind::ThreeDConflict => three_d_conflict(base),
            ScenarioKind::Crossing => crossing(base),
        }
    }

    /// Detector holding every non-primary mission.
    pub fn detector(&self, rules: DetectionRules) -> anyhow::Result<ConflictDetector> {
        build_detector(rules, self.others.clone())
    }

    pub fn verify(&self, detector: &ConflictDetector) -> DetectionReport {
        detector.verify_mission(&self.primary)
    }
}

fn at(base: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    base + TimeDelta::seconds(secs)
}

fn leg(
    id: &str,
    base: DateTime<Utc>,
    points: &[(f64, f64, f64, i64)],
) -> Result<Mission, MissionError> {
    let waypoints = points
        .iter()
        .map(|&(x, y, z, secs)| Waypoint::new(x, y, z, at(base, secs)))
        .collect();
    Mission::from_timed(id, waypoints)
}

fn conflict_free(base: DateTime<Utc>) -> Result<Scenario, MissionError> {
    Ok(Scenario {
        name: "conflict-free".to_string(),
        primary: leg("DRONE_A", base, &[(0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 300)])?,
        others: vec![
            leg("DRONE_B", base, &[(0.0, 50.0, 0.0, 0), (100.0, 50.0, 0.0, 300)])?,
            leg("DRONE_C", base, &[(50.0, -20.0, 0.0, 600), (50.0, 70.0, 0.0, 900)])?,
        ],
    })
}

fn direct_conflict(base: DateTime<Utc>) -> Result<Scenario, MissionError> {
    Ok(Scenario {
        name: "direct-conflict".to_string(),
        primary: leg("DRONE_A", base, &[(0.0, 0.0, 0.0, 0), (100.0, 100.0, 0.0, 300)])?,
        others: vec![
            leg("DRONE_B", base, &[(100.0, 0.0, 0.0, 0), (0.0, 100.0, 0.0, 300)])?,
            leg("DRONE_C", base, &[(-50.0, -50.0, 0.0, 0), (-60.0, -60.0, 0.0, 120)])?,
        ],
    })
}

fn three_d_conflict(base: DateTime<Utc>) -> Result<Scenario, MissionError> {
    Ok(Scenario {
        name: "three-d-conflict".to_string(),
        primary: leg(
            "DRONE_A",
            base,
            &[
                (0.0, 0.0, 0.0, 0),
                (50.0, 50.0, 100.0, 120),
                (100.0, 100.0, 100.0, 240),
            ],
        )?,
        others: vec![
            leg("DRONE_B", base, &[(100.0, 0.0, 100.0, 60), (0.0, 100.0, 100.0, 180)])?,
            leg("DRONE_C", base, &[(0.0, 0.0, 200.0, 0), (100.0, 100.0, 200.0, 240)])?,
        ],
    })
}

fn crossing(base: DateTime<Utc>) -> Result<Scenario, MissionError> {
    Ok(Scenario {
        name: "crossing".to_string(),
        primary: leg("DRONE_A", base, &[(0.0, 0.0, 0.0, 0), (100.0, 0.0, 0.0, 100)])?,
        others: vec![leg(
            "DRONE_B",
            base,
            &[(50.0, -50.0, 0.0, 40), (50.0, 50.0, 0.0, 60)],
        )?],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn pairs(kind: ScenarioKind) -> Vec<(String, String)> {
        let scenario = Scenario::build(kind, base()).unwrap();
        let detector = scenario.detector(DetectionRules::default()).unwrap();
        scenario.verify(&detector).conflicting_pairs()
    }

    #[test]
    fn test_conflict_free_scenario_is_clear() {
        assert!(pairs(ScenarioKind::ConflictFree).is_empty());
    }

    #[test]
    fn test_direct_conflict_scenario_flags_only_b() {
        assert_eq!(
            pairs(ScenarioKind::DirectConflict),
            vec![("DRONE_A".to_string(), "DRONE_B".to_string())]
        );
    }

    #[test]
    fn test_three_d_scenario_ignores_high_drone() {
        assert_eq!(
            pairs(ScenarioKind::ThreeDConflict),
            vec![("DRONE_A".to_string(), "DRONE_B".to_string())]
        );
    }

    #[test]
    fn test_crossing_scenario_conflicts() {
        let scenario = Scenario::build(ScenarioKind::Crossing, base()).unwrap();
        assert_eq!(scenario.others.len(), 1);
        assert_eq!(pairs(ScenarioKind::Crossing).len(), 1);
    }
}
