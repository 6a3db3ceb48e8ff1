//! Strategic deconfliction for UAV missions.
//!
//! Detects where planned trajectories come within a safety buffer of each
//! other at nearly the same time. Detection only: nothing here re-routes.

pub mod conflict;
pub mod error;
pub mod models;
pub mod rules;
pub mod spatial;
pub mod temporal;
pub mod trajectory;

pub use conflict::{ConflictDetector, DetectionReport, DetectionStatus};
pub use error::{MissionError, RegistryError, RulesError};
pub use models::{Conflict, Mission, MissionWaypoints, Position, Waypoint};
pub use rules::DetectionRules;
pub use spatial::{distance, find_candidates, CandidatePair};
pub use temporal::verify;
pub use trajectory::{interpolate, position_at, sample, SampleStep};
