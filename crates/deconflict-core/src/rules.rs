//! Detection thresholds for the deconfliction engine.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::trajectory::SampleStep;

/// Configuration for conflict detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRules {
    /// Minimum allowed separation, in coordinate units
    pub safety_buffer: f64,
    /// Maximum arrival-time difference that still counts as a conflict (seconds)
    pub time_threshold_secs: f64,
    /// Trajectory sampling interval (seconds)
    pub sample_step_secs: f64,
}

impl Default for DetectionRules {
    fn default() -> Self {
        Self {
            safety_buffer: 10.0,
            time_threshold_secs: 5.0,
            sample_step_secs: 1.0,
        }
    }
}

impl DetectionRules {
    pub fn new(safety_buffer: f64, time_threshold_secs: f64, sample_step_secs: f64) -> Self {
        Self {
            safety_buffer,
            time_threshold_secs,
            sample_step_secs,
        }
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        if !(self.safety_buffer.is_finite() && self.safety_buffer > 0.0) {
            return Err(RulesError::NonPositiveBuffer(self.safety_buffer));
        }
        if !(self.time_threshold_secs.is_finite() && self.time_threshold_secs >= 0.0) {
            return Err(RulesError::NegativeTimeThreshold(self.time_threshold_secs));
        }
        self.sample_step().map(|_| ())
    }

    pub fn sample_step(&self) -> Result<SampleStep, RulesError> {
        SampleStep::from_secs(self.sample_step_secs)
    }

    pub fn time_threshold(&self) -> TimeDelta {
        TimeDelta::microseconds((self.time_threshold_secs * 1_000_000.0).round() as i64)
    }
}
