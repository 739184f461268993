//! Feature Layout - Centralized Feature Definition
//!
//! **This type controls the feature schema**
//!
//! Position `i` of every feature vector always refers to `names[i]`, and
//! the baseline is stored per index. A baseline produced for one layout
//! must never be compared against traffic of another, so the layout is
//! hashed and the hash travels with the baseline file.
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Inputs of the served housing-price model, in request order
pub const DEFAULT_FEATURE_NAMES: &[&str] = &[
    "med_inc",     // 0: median income in block group
    "house_age",   // 1: median house age
    "ave_rooms",   // 2: average rooms per household
    "ave_bedrms",  // 3: average bedrooms per household
    "population",  // 4: block group population
    "ave_occup",   // 5: average household members
    "latitude",    // 6
    "longitude",   // 7
];

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    version: u8,
    names: Vec<String>,
}

impl FeatureLayout {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            version: FEATURE_VERSION,
            names,
        }
    }

    /// `feature1..featureN`, matching the request schema of the serving API
    pub fn generic(count: usize) -> Self {
        Self::new((1..=count).map(|i| format!("feature{}", i)).collect())
    }

    /// Layout for `count` features: the model's named inputs when the
    /// count matches, generic names otherwise
    pub fn for_count(count: usize) -> Self {
        if count == DEFAULT_FEATURE_NAMES.len() {
            Self::default()
        } else {
            Self::generic(count)
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// CRC32 over version and names, in order
    pub fn hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&[self.version]);

        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }

        hasher.finalize()
    }

    /// Check data tagged with (version, hash) against this layout
    pub fn validate(&self, version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
        let expected_hash = self.hash();

        if version != self.version || hash != expected_hash {
            return Err(LayoutMismatchError {
                expected_version: self.version,
                expected_hash,
                actual_version: version,
                actual_hash: hash,
            });
        }

        Ok(())
    }
}

impl Default for FeatureLayout {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURE_NAMES.iter().map(|s| s.to_string()).collect())
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = FeatureLayout::default();
        assert_eq!(layout.len(), 8);
        assert_eq!(layout.version(), FEATURE_VERSION);
        assert_eq!(layout.names()[0], "med_inc");
        assert_eq!(layout.names()[7], "longitude");
    }

    #[test]
    fn test_generic_layout() {
        let layout = FeatureLayout::generic(3);
        assert_eq!(layout.names(), &["feature1", "feature2", "feature3"]);
    }

    #[test]
    fn test_for_count() {
        assert_eq!(FeatureLayout::for_count(8), FeatureLayout::default());
        assert_eq!(FeatureLayout::for_count(4), FeatureLayout::generic(4));
    }

    #[test]
    fn test_layout_hash_consistency() {
        let a = FeatureLayout::default();
        let b = FeatureLayout::default();
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), 0);
    }

    #[test]
    fn test_hash_depends_on_order() {
        let a = FeatureLayout::new(vec!["x".into(), "y".into()]);
        let b = FeatureLayout::new(vec!["y".into(), "x".into()]);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_validate() {
        let layout = FeatureLayout::default();
        assert!(layout.validate(FEATURE_VERSION, layout.hash()).is_ok());
        assert!(layout.validate(FEATURE_VERSION + 1, layout.hash()).is_err());

        let err = layout.validate(FEATURE_VERSION, !layout.hash()).unwrap_err();
        assert_eq!(err.expected_hash, layout.hash());
        assert_eq!(err.actual_hash, !layout.hash());
    }
}
