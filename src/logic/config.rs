//! Detector Configuration
//!
//! Fixed at construction. Defaults and environment lookups live in
//! `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("window capacity must be > 0")]
    ZeroCapacity,

    #[error("feature count must be > 0")]
    ZeroFeatures,

    #[error("trigger threshold {trigger} must be below window capacity {capacity}")]
    TriggerUnreachable { trigger: usize, capacity: usize },

    #[error("{name} must be a finite value >= 0 (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Maximum observations kept in the window
    pub window_capacity: usize,

    /// Recompute runs while window size is strictly above this
    pub trigger_threshold: usize,

    /// Per-feature absolute drift above which the feature is flagged
    pub drift_threshold: f64,

    /// Drift score at or above which the global alert fires
    pub global_threshold: f64,

    /// Width of every feature vector
    pub feature_count: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_capacity: constants::DEFAULT_WINDOW_CAPACITY,
            trigger_threshold: constants::DEFAULT_TRIGGER_THRESHOLD,
            drift_threshold: constants::DEFAULT_FEATURE_THRESHOLD,
            global_threshold: constants::DEFAULT_GLOBAL_THRESHOLD,
            feature_count: constants::DEFAULT_FEATURE_COUNT,
        }
    }
}

impl DetectorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            window_capacity: constants::get_window_capacity(),
            trigger_threshold: constants::get_trigger_threshold(),
            drift_threshold: constants::get_feature_threshold(),
            global_threshold: constants::get_global_threshold(),
            feature_count: constants::get_feature_count(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.feature_count == 0 {
            return Err(ConfigError::ZeroFeatures);
        }
        if self.trigger_threshold >= self.window_capacity {
            return Err(ConfigError::TriggerUnreachable {
                trigger: self.trigger_threshold,
                capacity: self.window_capacity,
            });
        }

        check_threshold("drift_threshold", self.drift_threshold)?;
        check_threshold("global_threshold", self.global_threshold)?;
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}
