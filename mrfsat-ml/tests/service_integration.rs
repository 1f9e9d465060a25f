//! Integration tests for mrfsat-ml
//!
//! Train a forest, persist it, and drive the prediction service through
//! analyzer output the way the command-line tool does.

use mrfsat_core::{DegenerateClusterPolicy, FeatureSchema, Label};
use mrfsat_ml::{
    Classifier, ForestConfig, InstanceOutcome, PredictionConfig, PredictionError,
    PredictionService, RandomForest, SkipReason, evaluate, holdout_split,
};
use tempfile::tempdir;

/// Rows of (average_freedom, std_dev_freedom, ratio); SAT iff ratio > 0.5
fn legacy_training_set() -> (Vec<Vec<f64>>, Vec<Label>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for i in 1..60 {
        let ratio = i as f64 / 60.0;
        x.push(vec![0.5 + (i % 4) as f64 * 0.01, 0.1, ratio]);
        y.push(Label::from(ratio > 0.5));
    }
    (x, y)
}

fn save_forest(dir: &std::path::Path) -> std::path::PathBuf {
    let (x, y) = legacy_training_set();
    let mut forest = RandomForest::new(3, ForestConfig::default().with_trees(25).with_seed(5));
    forest.fit(&x, &y).unwrap();

    let path = dir.join("model.json");
    std::fs::write(&path, forest.save().unwrap()).unwrap();
    path
}

#[test]
fn test_load_and_classify_analyzer_output() {
    let dir = tempdir().unwrap();
    let config = PredictionConfig::new(save_forest(dir.path())).legacy();
    let service = PredictionService::load(&config).unwrap();

    let stdout = "parsing formula...\nbench/x.opb,9,10,40,20,0.5,0.1,\n";
    assert_eq!(
        service.classify_output(stdout).unwrap(),
        InstanceOutcome::Predicted { label: Label::Sat }
    );

    let stdout = "bench/y.opb,1,10,40,20,0.5,0.1\n";
    assert_eq!(
        service.classify_output(stdout).unwrap().label(),
        Some(Label::Unsat)
    );
}

#[test]
fn test_batch_continues_past_bad_instances() {
    let dir = tempdir().unwrap();
    let config = PredictionConfig::new(save_forest(dir.path())).legacy();
    let service = PredictionService::load(&config).unwrap();

    let lines = [
        "good1,9,10,40,20,0.5,0.1",
        "degenerate,0,0,40,20,0.5,0.1",
        "garbage",
        "good2,2,10,40,20,0.5,0.1",
    ];
    let outcomes: Vec<InstanceOutcome> = lines
        .iter()
        .map(|l| service.classify_line(l).unwrap())
        .collect();

    let labels: Vec<Option<Label>> = outcomes.iter().map(InstanceOutcome::label).collect();
    assert_eq!(labels, vec![Some(Label::Sat), None, None, Some(Label::Unsat)]);
    assert!(matches!(
        outcomes[1],
        InstanceOutcome::Skipped {
            reason: SkipReason::DegenerateClusters(_)
        }
    ));
}

#[test]
fn test_zero_fill_policy_classifies_degenerate_instances() {
    let dir = tempdir().unwrap();
    let config = PredictionConfig::new(save_forest(dir.path()))
        .legacy()
        .with_policy(DegenerateClusterPolicy::ZeroFill);
    let service = PredictionService::load(&config).unwrap();

    let outcome = service.classify_line("degenerate,0,0,40,20,0.5,0.1").unwrap();
    assert_eq!(outcome.label(), Some(Label::Unsat));
}

#[test]
fn test_schema_mismatch_is_fatal() {
    let dir = tempdir().unwrap();
    let mut config = PredictionConfig::new(save_forest(dir.path()));
    config.feature_schema = FeatureSchema::canonical();
    config.record_schema = "legacy".to_string();

    // canonical features need strength fields the legacy layout lacks
    let err = PredictionService::load(&config).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_corrupt_model_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, b"{ not a model").unwrap();

    let err = PredictionService::load(&PredictionConfig::new(path)).unwrap_err();
    assert!(matches!(err, PredictionError::Model(_)));
}

#[test]
fn test_holdout_evaluation_on_separable_data() {
    let (x, y) = legacy_training_set();
    let split = holdout_split(&x, &y, 0.2, Some(9)).unwrap();

    let mut forest = RandomForest::new(3, ForestConfig::default().with_trees(20).with_seed(9));
    forest.fit(&split.train_x, &split.train_y).unwrap();

    let eval = evaluate(&forest, &split.test_x, &split.test_y);
    assert_eq!(eval.total(), split.test_x.len());
    assert!(eval.accuracy() >= 0.8);
}
