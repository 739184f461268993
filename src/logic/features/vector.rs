//! Feature Vector & Observation - Core data structures of the drift engine
//!
//! A `FeatureVector` can only be built through `FeatureVector::new`, which
//! checks width and finiteness. Anything that reaches the window has
//! therefore already been validated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeatureError {
    #[error("expected {expected} features, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("feature {index} is not finite ({value})")]
    NonFinite { index: usize, value: f64 },
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Ordered, fixed-width feature values of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Validate and wrap raw values. No padding or truncation.
    pub fn new(values: Vec<f64>, expected_len: usize) -> Result<Self, FeatureError> {
        if values.len() != expected_len {
            return Err(FeatureError::WrongLength {
                expected: expected_len,
                actual: values.len(),
            });
        }

        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(FeatureError::NonFinite { index, value });
        }

        Ok(Self(values))
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }
}

impl From<FeatureVector> for Vec<f64> {
    fn from(fv: FeatureVector) -> Self {
        fv.0
    }
}

// ============================================================================
// OBSERVATION
// ============================================================================

/// One served request as seen by the drift engine. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub features: FeatureVector,
    pub prediction: f64,
}

impl Observation {
    pub fn new(
        timestamp: DateTime<Utc>,
        request_id: impl Into<String>,
        features: FeatureVector,
        prediction: f64,
    ) -> Self {
        Self {
            timestamp,
            request_id: request_id.into(),
            features,
            prediction,
        }
    }
}
