//! Deconfliction CLI - command line shell around `deconflict-core`.
//!
//! Provides:
//! - mission file loading
//! - built-in demonstration scenarios
//! - parallel pair dispatch on tokio
//! - text/JSON report rendering

pub mod config;
pub mod loader;
pub mod parallel;
pub mod report;
pub mod scenarios;

pub use config::Config;
pub use loader::{load_missions, MissionFile};
pub use parallel::run_parallel;
pub use scenarios::{Scenario, ScenarioKind};
