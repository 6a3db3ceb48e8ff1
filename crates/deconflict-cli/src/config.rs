//! CLI configuration from environment.

use std::env;

use deconflict_core::DetectionRules;

#[derive(Debug, Clone)]
pub struct Config {
    pub safety_buffer: f64,
    pub time_threshold_secs: f64,
    pub sample_step_secs: f64,
    /// Upper bound on pairs checked at once by `--parallel`
    pub max_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        let rules = DetectionRules::default();
        Self {
            safety_buffer: rules.safety_buffer,
            time_threshold_secs: rules.time_threshold_secs,
            sample_step_secs: rules.sample_step_secs,
            max_concurrency: 4,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            safety_buffer: parse_var("DECONFLICT_SAFETY_BUFFER").unwrap_or(defaults.safety_buffer),
            time_threshold_secs: parse_var("DECONFLICT_TIME_THRESHOLD_SECS")
                .unwrap_or(defaults.time_threshold_secs),
            sample_step_secs: parse_var("DECONFLICT_SAMPLE_STEP_SECS")
                .unwrap_or(defaults.sample_step_secs),
            max_concurrency: parse_var("DECONFLICT_MAX_CONCURRENCY")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrency),
        }
    }

    pub fn rules(&self) -> DetectionRules {
        DetectionRules::new(
            self.safety_buffer,
            self.time_threshold_secs,
            self.sample_step_secs,
        )
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}
