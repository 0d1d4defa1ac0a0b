//! Stage artifacts
//!
//! Immutable records passed between pipeline stages. Each is created once
//! per run by exactly one stage, consumed by the next, and never mutated.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output of ingestion: where the train/test splits were written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionArtifact {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Output of validation
///
/// `passed` reflects structural checks only; drift is advisory and lives in
/// `message` and the persisted report. When `passed` is false, `message`
/// describes every failing check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationArtifact {
    pub passed: bool,
    pub message: String,
    pub drift_report_path: PathBuf,
}

/// Output of transformation: fitted preprocessor and transformed matrices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationArtifact {
    pub preprocessor_path: PathBuf,
    pub transformed_train_path: PathBuf,
    pub transformed_test_path: PathBuf,
}

/// Test-set scores of the selected model, all in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub f1: f64,
    pub precision: f64,
    pub recall: f64,
}

/// Output of training: the serialized bundle and its scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerArtifact {
    pub model_path: PathBuf,
    pub metrics: ClassificationMetrics,
}

/// Output of evaluation
///
/// `score_delta = new_f1 - baseline_f1`, with baseline 0 when no promoted
/// model exists. `accepted` requires a strictly positive delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationArtifact {
    pub accepted: bool,
    pub new_model_path: PathBuf,
    pub remote_model_key: String,
    pub score_delta: f64,
}

/// Output of promotion: where the bundle now lives remotely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PusherArtifact {
    pub bucket: String,
    pub remote_key: String,
    /// SHA-256 of the uploaded bundle
    pub digest: String,
}
