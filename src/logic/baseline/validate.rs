use crate::logic::features::{FeatureLayout, LayoutMismatchError};
use super::BaselineReference;

#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Baseline {0}")]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("reference dataset is empty")]
    EmptyDataset,

    #[error("{what} has {actual} values, layout has {expected}")]
    WrongWidth {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{statistic}[{index}] is not finite")]
    NonFinite { statistic: &'static str, index: usize },
}

/// Validate baseline compatibility with the layout traffic will use
pub fn validate_baseline(baseline: &BaselineReference, layout: &FeatureLayout) -> Result<(), BaselineError> {
    layout.validate(baseline.feature_version(), baseline.layout_hash())?;
    check_columns(baseline.mean(), baseline.variance(), baseline.median(), layout.len())
}

/// Width and finiteness of the three baseline vectors
pub(super) fn check_columns(
    mean: &[f64],
    variance: &[f64],
    median: &[f64],
    expected: usize,
) -> Result<(), BaselineError> {
    for (what, values) in [("mean", mean), ("variance", variance), ("median", median)] {
        if values.len() != expected {
            return Err(BaselineError::WrongWidth {
                what,
                expected,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(BaselineError::NonFinite { statistic: what, index });
        }
    }
    Ok(())
}
