use super::{load_or_derive, BaselineReference};
use super::validate::{validate_baseline, BaselineError};
use super::storage::{save_baseline, load_baseline};
use crate::logic::drift::Statistic;
use crate::logic::features::layout::FEATURE_VERSION;
use crate::logic::features::FeatureLayout;

fn two_feature_layout() -> FeatureLayout {
    FeatureLayout::generic(2)
}

#[test]
fn test_from_samples() {
    let layout = two_feature_layout();
    let rows = vec![
        vec![1.0, 10.0],
        vec![2.0, 20.0],
        vec![3.0, 30.0],
        vec![6.0, 40.0],
    ];

    let b = BaselineReference::from_samples(&layout, &rows).unwrap();
    assert_eq!(b.feature_count(), 2);
    assert_eq!(b.samples(), 4);
    assert_eq!(b.mean(), &[3.0, 25.0]);
    assert_eq!(b.variance(), &[3.5, 125.0]);
    assert_eq!(b.median(), &[2.5, 25.0]);
    assert_eq!(b.feature_version(), FEATURE_VERSION);
    assert_eq!(b.layout_hash(), layout.hash());
}

#[test]
fn test_values_by_statistic() {
    let layout = two_feature_layout();
    let b = BaselineReference::from_parts(&layout, vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]).unwrap();
    assert_eq!(b.values(Statistic::Mean), &[1.0, 2.0]);
    assert_eq!(b.values(Statistic::Spread), &[3.0, 4.0]);
    assert_eq!(b.values(Statistic::Median), &[5.0, 6.0]);
}

#[test]
fn test_reject_empty_dataset() {
    let rows: Vec<Vec<f64>> = Vec::new();
    let result = BaselineReference::from_samples(&two_feature_layout(), &rows);
    assert!(matches!(result, Err(BaselineError::EmptyDataset)));
}

#[test]
fn test_reject_ragged_rows() {
    let rows = vec![vec![1.0, 2.0], vec![1.0]];
    let result = BaselineReference::from_samples(&two_feature_layout(), &rows);
    assert!(matches!(
        result,
        Err(BaselineError::WrongWidth { expected: 2, actual: 1, .. })
    ));
}

#[test]
fn test_reject_wrong_width_parts() {
    let result = BaselineReference::from_parts(&two_feature_layout(), vec![0.0; 2], vec![0.0; 3], vec![0.0; 2]);
    assert!(matches!(
        result,
        Err(BaselineError::WrongWidth { what: "variance", expected: 2, actual: 3 })
    ));
}

#[test]
fn test_reject_non_finite_parts() {
    let result = BaselineReference::from_parts(&two_feature_layout(), vec![0.0, f64::NAN], vec![0.0; 2], vec![0.0; 2]);
    assert!(matches!(result, Err(BaselineError::NonFinite { statistic: "mean", index: 1 })));
}

#[test]
fn test_reject_layout_mismatch() {
    let b = BaselineReference::from_parts(&FeatureLayout::generic(8), vec![0.0; 8], vec![1.0; 8], vec![0.0; 8]).unwrap();

    assert!(validate_baseline(&b, &FeatureLayout::generic(8)).is_ok());

    match validate_baseline(&b, &FeatureLayout::default()) {
        Err(BaselineError::LayoutMismatch(e)) => {
            assert_eq!(e.expected_hash, FeatureLayout::default().hash());
            assert_eq!(e.actual_hash, FeatureLayout::generic(8).hash());
        },
        _ => panic!("Expected LayoutMismatch error"),
    }
}

#[test]
fn test_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("baseline.json");
    let layout = two_feature_layout();

    let original = BaselineReference::from_samples(&layout, &[[1.0, 2.0], [3.0, 4.0]]).unwrap();
    save_baseline(&original, &path).unwrap();

    let loaded = load_baseline(&path, &layout).unwrap();
    assert_eq!(loaded, original);

    assert!(load_baseline(&path, &FeatureLayout::generic(3)).is_err());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_baseline(&dir.path().join("absent.json"), &two_feature_layout());
    assert!(matches!(result, Err(BaselineError::Io(_))));
}

#[test]
fn test_load_or_derive_persists_new_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("baseline.json");
    let layout = two_feature_layout();

    let derived = load_or_derive(&path, &layout, || {
        BaselineReference::from_samples(&layout, &[[0.0, 0.0], [2.0, 2.0]])
    })
    .unwrap();
    assert_eq!(derived.mean(), &[1.0, 1.0]);
    assert!(path.exists());

    // Second call loads the stored file instead of deriving
    let loaded = load_or_derive(&path, &layout, || panic!("should not derive")).unwrap();
    assert_eq!(loaded, derived);
}
