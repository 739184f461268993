//! Tests for feature validation and observation construction

use chrono::Utc;

use super::layout::FeatureLayout;
use super::vector::{FeatureError, FeatureVector, Observation};

#[test]
fn test_accepts_matching_width() {
    let fv = FeatureVector::new(vec![1.0, 2.0, 3.0], 3).unwrap();
    assert_eq!(fv.get(1), Some(2.0));
    assert_eq!(fv.get(3), None);
    assert_eq!(Vec::from(fv), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_rejects_short_and_long_vectors() {
    assert_eq!(
        FeatureVector::new(vec![1.0; 7], 8),
        Err(FeatureError::WrongLength { expected: 8, actual: 7 })
    );
    assert_eq!(
        FeatureVector::new(vec![1.0; 9], 8),
        Err(FeatureError::WrongLength { expected: 8, actual: 9 })
    );
}

#[test]
fn test_rejects_non_finite_values() {
    let err = FeatureVector::new(vec![0.0, f64::NAN, 1.0], 3).unwrap_err();
    assert!(matches!(err, FeatureError::NonFinite { index: 1, .. }));

    let err = FeatureVector::new(vec![f64::INFINITY, 0.0, 1.0], 3).unwrap_err();
    assert!(matches!(err, FeatureError::NonFinite { index: 0, .. }));
}

#[test]
fn test_vector_width_matches_layout() {
    let layout = FeatureLayout::default();
    let fv = FeatureVector::new(vec![0.5; layout.len()], layout.len()).unwrap();
    assert_eq!(fv.get(layout.len() - 1), Some(0.5));
    assert_eq!(fv.get(layout.len()), None);
}

#[test]
fn test_observation_serializes_features_as_array() {
    let fv = FeatureVector::new(vec![1.0, 2.0], 2).unwrap();
    let obs = Observation::new(Utc::now(), "req-1", fv, 3.5);

    let json = serde_json::to_value(&obs).unwrap();
    assert_eq!(json["request_id"], "req-1");
    assert_eq!(json["features"], serde_json::json!([1.0, 2.0]));
    assert_eq!(json["prediction"], 3.5);

    let back: Observation = serde_json::from_value(json).unwrap();
    assert_eq!(back, obs);
}
