use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use verdant::{
    AgbError, AgbEstimator, ArtifactReader, Channel, EstimateSource, EstimatorState,
    FixedFeatureSource,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn artifact_names() -> Vec<String> {
    Channel::ORDERED.iter().map(|c| c.name().to_string()).collect()
}

/// Write a well-formed model/scaler artifact pair into a temp directory
fn write_artifacts(dir: &TempDir) -> (PathBuf, PathBuf) {
    let model = serde_json::json!({
        "feature_names": artifact_names(),
        "coefficients": vec![0.0; Channel::ORDERED.len()],
        "intercept": 42.5,
    });
    let scaler = serde_json::json!({
        "mean": vec![0.0; Channel::ORDERED.len()],
        "scale": vec![1.0; Channel::ORDERED.len()],
    });

    let model_path = dir.path().join("agb_production_model_cleaned.json");
    let scaler_path = dir.path().join("agb_production_scaler_cleaned.json");
    fs::write(&model_path, model.to_string()).expect("write model");
    fs::write(&scaler_path, scaler.to_string()).expect("write scaler");
    (model_path, scaler_path)
}

#[test]
fn test_artifact_round_trip_and_prediction() {
    init_logging();
    println!("=== Artifact Round Trip ===");

    let dir = TempDir::new().expect("temp dir");
    let (model_path, scaler_path) = write_artifacts(&dir);

    let model = ArtifactReader::read_model(&model_path).expect("model loads");
    assert_eq!(model.coefficients.len(), 21);
    assert_eq!(model.intercept, 42.5);

    let scaler = ArtifactReader::read_scaler(&scaler_path).expect("scaler loads");
    assert_eq!(scaler.mean.len(), 21);

    let estimator = AgbEstimator::from_artifacts(&model_path, &scaler_path);
    assert_eq!(estimator.state(), EstimatorState::Loaded);

    let estimate = estimator
        .predict_at(&FixedFeatureSource, -1.2921, 36.8219)
        .expect("valid point");
    assert_eq!(estimate.source, EstimateSource::Model);
    assert_eq!(estimate.agb_mg_ha, 42.5);
}

#[test]
fn test_reordered_feature_names_rejected_at_load() {
    init_logging();

    let dir = TempDir::new().expect("temp dir");
    let mut names = artifact_names();
    names.swap(3, 4); // B8 and B11 swapped: fitted on a different ordering

    let model = serde_json::json!({
        "feature_names": names,
        "coefficients": vec![0.0; Channel::ORDERED.len()],
        "intercept": 42.5,
    });
    let path = dir.path().join("stale_model.json");
    fs::write(&path, model.to_string()).expect("write model");

    match ArtifactReader::read_model(&path) {
        Err(AgbError::Artifact(message)) => {
            assert!(message.contains("order mismatch"), "message: {}", message);
        }
        other => panic!("expected artifact error, got {:?}", other.map(|m| m.intercept)),
    }
}

#[test]
fn test_wrong_arity_rejected_at_load() {
    init_logging();

    let dir = TempDir::new().expect("temp dir");
    let scaler = serde_json::json!({
        "mean": vec![0.0; 15],
        "scale": vec![1.0; 15],
    });
    let path = dir.path().join("short_scaler.json");
    fs::write(&path, scaler.to_string()).expect("write scaler");

    assert!(matches!(
        ArtifactReader::read_scaler(&path),
        Err(AgbError::Artifact(_))
    ));
}

#[test]
fn test_malformed_json_is_a_json_error() {
    init_logging();

    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("corrupt.json");
    fs::write(&path, "{not json").expect("write file");

    assert!(matches!(
        ArtifactReader::read_model(&path),
        Err(AgbError::Json(_))
    ));
}

#[test]
fn test_missing_artifacts_degrade_permanently() {
    init_logging();
    println!("=== Missing Artifacts ===");

    let estimator = AgbEstimator::from_artifacts("/nonexistent/model.json", "/nonexistent/scaler.json");
    assert_eq!(estimator.state(), EstimatorState::Degraded);

    // Degraded is permanent: repeated calls keep falling back, never error
    for _ in 0..20 {
        let estimate = estimator
            .predict_at(&FixedFeatureSource, -1.2921, 36.8219)
            .expect("valid point");
        assert_eq!(estimate.source, EstimateSource::Fallback);
        assert!(estimate.agb_mg_ha >= 10.0 && estimate.agb_mg_ha <= 60.0);
    }
    assert_eq!(estimator.state(), EstimatorState::Degraded);
}

#[test]
fn test_scaler_standardization_feeds_model() {
    init_logging();

    let dir = TempDir::new().expect("temp dir");

    // One active coefficient (on B8) with a non-trivial scaler, so the
    // transform visibly participates: agb = 10 + 2 * (b8 - 2000) / 500
    let b8_index = Channel::ORDERED.iter().position(|c| *c == Channel::B8).expect("B8");
    let mut coefficients = vec![0.0; Channel::ORDERED.len()];
    coefficients[b8_index] = 2.0;
    let mut mean = vec![0.0; Channel::ORDERED.len()];
    let mut scale = vec![1.0; Channel::ORDERED.len()];
    mean[b8_index] = 2000.0;
    scale[b8_index] = 500.0;

    let model = serde_json::json!({
        "feature_names": artifact_names(),
        "coefficients": coefficients,
        "intercept": 10.0,
    });
    let scaler = serde_json::json!({ "mean": mean, "scale": scale });

    let model_path = dir.path().join("model.json");
    let scaler_path = dir.path().join("scaler.json");
    fs::write(&model_path, model.to_string()).expect("write model");
    fs::write(&scaler_path, scaler.to_string()).expect("write scaler");

    let estimator = AgbEstimator::from_artifacts(&model_path, &scaler_path);
    let estimate = estimator
        .predict_at(&FixedFeatureSource, -1.2921, 36.8219)
        .expect("valid point");

    // Fixed source has B8 = 2958
    let expected = 10.0 + 2.0 * (2958.0 - 2000.0) / 500.0;
    assert_eq!(estimate.source, EstimateSource::Model);
    assert!((estimate.agb_mg_ha - expected).abs() < 1e-9);
}
