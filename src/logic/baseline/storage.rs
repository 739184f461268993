use std::fs;
use std::path::Path;

use crate::logic::features::FeatureLayout;
use super::BaselineReference;
use super::validate::{validate_baseline, BaselineError};

/// Save baseline to disk
pub fn save_baseline(baseline: &BaselineReference, path: &Path) -> Result<(), BaselineError> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(baseline)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load baseline from disk, rejecting files built for another layout
pub fn load_baseline(path: &Path, layout: &FeatureLayout) -> Result<BaselineReference, BaselineError> {
    let data = fs::read(path)?;
    let baseline: BaselineReference = serde_json::from_slice(&data)?;

    validate_baseline(&baseline, layout)?;

    Ok(baseline)
}
