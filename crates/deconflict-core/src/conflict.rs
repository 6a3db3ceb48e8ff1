//! Conflict detection across a registry of missions.
//!
//! Every unordered pair of registered missions is sampled, scanned for
//! spatially close points, and each candidate is confirmed in time. Results
//! are recomputed from scratch on every run.

use chrono::TimeDelta;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{RegistryError, RulesError};
use crate::models::{Conflict, Mission, Waypoint};
use crate::rules::DetectionRules;
use crate::spatial::find_candidates;
use crate::temporal::verify;
use crate::trajectory::{sample, SampleStep};

/// Overall outcome of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    /// No conflicts found
    Clear,
    /// At least one confirmed conflict
    Conflict,
}

/// Status plus the ordered list of confirmed conflicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub status: DetectionStatus,
    pub conflicts: Vec<Conflict>,
}

impl DetectionReport {
    pub fn from_conflicts(conflicts: Vec<Conflict>) -> Self {
        let status = if conflicts.is_empty() {
            DetectionStatus::Clear
        } else {
            DetectionStatus::Conflict
        };
        Self { status, conflicts }
    }

    pub fn is_clear(&self) -> bool {
        self.status == DetectionStatus::Clear
    }

    /// Distinct drone pairs in conflict, in order of first appearance.
    pub fn conflicting_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for conflict in &self.conflicts {
            let mut ids = conflict.drone_ids().iter();
            let (Some(a), Some(b)) = (ids.next(), ids.next()) else {
                continue;
            };
            if !pairs.iter().any(|(x, y)| x == a && y == b) {
                pairs.push((a.clone(), b.clone()));
            }
        }
        pairs
    }
}

/// Strategic deconfliction engine.
///
/// Holds the registered missions in registration order, which is also the
/// order pairs are checked and conflicts reported in.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    rules: DetectionRules,
    step: SampleStep,
    time_threshold: TimeDelta,
    missions: IndexMap<String, Mission>,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        let rules = DetectionRules::default();
        let time_threshold = rules.time_threshold();
        Self {
            rules,
            step: SampleStep::default(),
            time_threshold,
            missions: IndexMap::new(),
        }
    }
}

impl ConflictDetector {
    /// Create a detector with validated rules.
    pub fn new(rules: DetectionRules) -> Result<Self, RulesError> {
        rules.validate()?;
        let step = rules.sample_step()?;
        let time_threshold = rules.time_threshold();
        Ok(Self {
            rules,
            step,
            time_threshold,
            missions: IndexMap::new(),
        })
    }

    pub fn rules(&self) -> &DetectionRules {
        &self.rules
    }

    pub fn sample_step(&self) -> SampleStep {
        self.step
    }

    /// Add a mission. Invalid missions and duplicate drone ids never enter
    /// the registry.
    pub fn register(&mut self, mission: Mission) -> Result<(), RegistryError> {
        mission.validate()?;
        if self.missions.contains_key(mission.drone_id()) {
            return Err(RegistryError::DuplicateDroneId(mission.drone_id().to_string()));
        }
        tracing::debug!(
            "Registered mission {} ({} waypoints)",
            mission.drone_id(),
            mission.waypoints().len()
        );
        self.missions.insert(mission.drone_id().to_string(), mission);
        Ok(())
    }

    /// Remove a mission, keeping the remaining registration order.
    pub fn remove(&mut self, drone_id: &str) -> Option<Mission> {
        self.missions.shift_remove(drone_id)
    }

    pub fn get(&self, drone_id: &str) -> Option<&Mission> {
        self.missions.get(drone_id)
    }

    /// Registered missions in registration order.
    pub fn missions(&self) -> impl Iterator<Item = &Mission> {
        self.missions.values()
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    /// Index pairs `(i, j)` with `i < j`, in canonical order.
    pub fn mission_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.missions.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect()
    }

    /// Run the full sample, scan, verify pipeline for one pair.
    pub fn detect_pair(&self, mission_a: &Mission, mission_b: &Mission) -> Vec<Conflict> {
        let traj_a = sample(mission_a, self.step);
        let traj_b = sample(mission_b, self.step);
        self.detect_sampled(mission_a, &traj_a, mission_b, &traj_b)
    }

    /// Check every registered pair.
    pub fn run(&self) -> DetectionReport {
        let missions: Vec<&Mission> = self.missions.values().collect();
        let trajectories: Vec<Vec<Waypoint>> =
            missions.iter().map(|m| sample(m, self.step)).collect();

        let mut conflicts = Vec::new();
        for (i, j) in self.mission_pairs() {
            conflicts.extend(self.detect_sampled(
                missions[i],
                &trajectories[i],
                missions[j],
                &trajectories[j],
            ));
        }

        tracing::info!(
            "Checked {} mission(s): {} conflict(s)",
            missions.len(),
            conflicts.len()
        );
        DetectionReport::from_conflicts(conflicts)
    }

    /// Check an unregistered primary mission against every registered one.
    ///
    /// A registered mission sharing the primary's drone id is skipped.
    pub fn verify_mission(&self, primary: &Mission) -> DetectionReport {
        let primary_traj = sample(primary, self.step);
        let mut conflicts = Vec::new();

        for other in self.missions.values() {
            if other.drone_id() == primary.drone_id() {
                continue;
            }
            let other_traj = sample(other, self.step);
            conflicts.extend(self.detect_sampled(primary, &primary_traj, other, &other_traj));
        }

        tracing::info!(
            "Verified {} against {} mission(s): {} conflict(s)",
            primary.drone_id(),
            self.missions.len(),
            conflicts.len()
        );
        DetectionReport::from_conflicts(conflicts)
    }

    fn detect_sampled(
        &self,
        mission_a: &Mission,
        traj_a: &[Waypoint],
        mission_b: &Mission,
        traj_b: &[Waypoint],
    ) -> Vec<Conflict> {
        let candidates = find_candidates(
            traj_a,
            traj_b,
            self.rules.safety_buffer,
            self.step.as_delta(),
        );

        let conflicts: Vec<Conflict> = candidates
            .iter()
            .filter_map(|candidate| {
                verify(
                    mission_a,
                    mission_b,
                    candidate,
                    self.rules.safety_buffer,
                    self.time_threshold,
                )
            })
            .collect();

        tracing::debug!(
            "{} <-> {}: {} candidate(s), {} conflict(s)",
            mission_a.drone_id(),
            mission_b.drone_id(),
            candidates.len(),
            conflicts.len()
        );
        conflicts
    }
}
