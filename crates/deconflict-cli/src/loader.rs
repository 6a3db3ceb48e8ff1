//! Mission file loading.
//!
//! Expected layout:
//! ```json
//! { "missions": [ { "drone_id": "DRONE001",
//!                   "start_time": "2024-01-01T00:00:00Z",
//!                   "end_time": "2024-01-01T00:05:00Z",
//!                   "waypoints": [ { "x": 0, "y": 0, "z": 50 }, { "x": 100, "y": 0 } ] } ] }
//! ```

use anyhow::{Context, Result};
use deconflict_core::{ConflictDetector, DetectionRules, Mission};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionFile {
    pub missions: Vec<Mission>,
}

impl MissionFile {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse mission file")
    }
}

/// Read and validate every mission in a JSON file.
pub fn load_missions(path: &Path) -> Result<Vec<Mission>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mission file {}", path.display()))?;
    let file = MissionFile::from_json(&json)
        .with_context(|| format!("Invalid mission file {}", path.display()))?;
    tracing::info!("Loaded {} mission(s) from {}", file.missions.len(), path.display());
    Ok(file.missions)
}

/// Register `missions` in order on a fresh detector.
pub fn build_detector(rules: DetectionRules, missions: Vec<Mission>) -> Result<ConflictDetector> {
    let mut detector = ConflictDetector::new(rules).context("Invalid detection rules")?;
    for mission in missions {
        let drone_id = mission.drone_id().to_string();
        detector
            .register(mission)
            .with_context(|| format!("Failed to register mission {}", drone_id))?;
    }
    Ok(detector)
}
