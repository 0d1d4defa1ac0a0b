//! Pipeline configuration
//!
//! One explicit structure threaded through the orchestrator constructor.
//! Every run writes its artifacts under a timestamped directory so
//! sequential runs never collide.

use crate::drift::DriftConfig;
use crate::model::SearchSpace;
use crate::preprocess::ResampleConfig;
use crate::schema::DataSchema;
use chrono::{Datelike, Utc};
use std::path::PathBuf;

/// Well-known object-store key of the promoted model
pub const DEFAULT_MODEL_KEY: &str = "model.bin";

/// Everything a training run needs to know
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Document-store collection holding the raw dataset
    pub collection_name: String,
    /// Test fraction of the shuffled split, in (0, 1)
    pub train_test_split_ratio: f64,
    /// Seed for the split shuffle and resampling
    pub seed: u64,
    /// Year used to derive company age from the establishment year
    pub current_year: i32,
    /// Root directory for run artifacts
    pub artifact_dir: PathBuf,
    /// Run identifier; names the per-run artifact directory
    pub timestamp: String,
    /// Object-store bucket holding the promoted model
    pub bucket_name: String,
    /// Well-known key of the promoted-model slot
    pub model_key: String,
    /// Dataset schema
    pub schema: DataSchema,
    /// Candidate model grids and the acceptance floor
    pub search_space: SearchSpace,
    /// Drift detection thresholds
    pub drift: DriftConfig,
    /// Class rebalancing parameters
    pub resample: ResampleConfig,
}

impl PipelineConfig {
    /// Configuration for a fresh run, timestamped now
    pub fn new(
        artifact_dir: impl Into<PathBuf>,
        collection_name: impl Into<String>,
        schema: DataSchema,
        search_space: SearchSpace,
    ) -> Self {
        let now = Utc::now();
        Self {
            collection_name: collection_name.into(),
            train_test_split_ratio: 0.2,
            seed: 42,
            current_year: now.year(),
            artifact_dir: artifact_dir.into(),
            timestamp: now.format("%m_%d_%Y_%H_%M_%S").to_string(),
            bucket_name: "visado-models".to_string(),
            model_key: DEFAULT_MODEL_KEY.to_string(),
            schema,
            search_space,
            drift: DriftConfig::default(),
            resample: ResampleConfig::default(),
        }
    }

    /// Override the split ratio
    pub fn with_split_ratio(mut self, ratio: f64) -> Self {
        self.train_test_split_ratio = ratio;
        self
    }

    /// Override the RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.resample.seed = seed;
        self
    }

    /// Override the company-age reference year
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    /// Override bucket and key of the promoted-model slot
    pub fn with_model_slot(mut self, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        self.bucket_name = bucket.into();
        self.model_key = key.into();
        self
    }

    /// Per-run artifact directory
    pub fn run_dir(&self) -> PathBuf {
        self.artifact_dir.join(&self.timestamp)
    }

    /// Full-dataset snapshot written by ingestion
    pub fn feature_store_path(&self) -> PathBuf {
        self.run_dir()
            .join("data_ingestion")
            .join("feature_store")
            .join("visas.csv")
    }

    /// Train split CSV
    pub fn train_path(&self) -> PathBuf {
        self.run_dir()
            .join("data_ingestion")
            .join("ingested")
            .join("train.csv")
    }

    /// Test split CSV
    pub fn test_path(&self) -> PathBuf {
        self.run_dir()
            .join("data_ingestion")
            .join("ingested")
            .join("test.csv")
    }

    /// Drift report YAML written by validation
    pub fn drift_report_path(&self) -> PathBuf {
        self.run_dir()
            .join("data_validation")
            .join("drift_report")
            .join("report.yaml")
    }

    /// Serialized fitted preprocessor
    pub fn preprocessor_path(&self) -> PathBuf {
        self.run_dir()
            .join("data_transformation")
            .join("transformed_object")
            .join("preprocessing.bin")
    }

    /// Transformed train matrix
    pub fn transformed_train_path(&self) -> PathBuf {
        self.run_dir()
            .join("data_transformation")
            .join("transformed")
            .join("train.bin")
    }

    /// Transformed test matrix
    pub fn transformed_test_path(&self) -> PathBuf {
        self.run_dir()
            .join("data_transformation")
            .join("transformed")
            .join("test.bin")
    }

    /// Serialized model bundle
    pub fn model_path(&self) -> PathBuf {
        self.run_dir()
            .join("model_trainer")
            .join("trained_model")
            .join("model.bin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CandidateGrid;

    fn space() -> SearchSpace {
        SearchSpace {
            expected_accuracy: 0.6,
            cv_folds: 5,
            seed: 42,
            candidates: vec![CandidateGrid::KNearest {
                n_neighbors: vec![3],
            }],
        }
    }

    #[test]
    fn test_paths_scoped_to_run_dir() {
        let config = PipelineConfig::new("artifact", "visas", DataSchema::visa(), space());
        let run_dir = config.run_dir();

        for path in [
            config.feature_store_path(),
            config.train_path(),
            config.test_path(),
            config.drift_report_path(),
            config.preprocessor_path(),
            config.transformed_train_path(),
            config.transformed_test_path(),
            config.model_path(),
        ] {
            assert!(
                path.starts_with(&run_dir),
                "{path:?} escapes run dir {run_dir:?}"
            );
        }
    }

    #[test]
    fn test_distinct_timestamps_do_not_collide() {
        let mut a = PipelineConfig::new("artifact", "visas", DataSchema::visa(), space());
        let mut b = PipelineConfig::new("artifact", "visas", DataSchema::visa(), space());
        a.timestamp = "01_01_2026_10_00_00".into();
        b.timestamp = "01_01_2026_10_00_01".into();
        assert_ne!(a.run_dir(), b.run_dir());
    }

    #[test]
    fn test_builder_overrides() {
        let config = PipelineConfig::new("artifact", "visas", DataSchema::visa(), space())
            .with_split_ratio(0.3)
            .with_seed(7)
            .with_current_year(2024)
            .with_model_slot("bucket", "slot.bin");

        assert_eq!(config.train_test_split_ratio, 0.3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.resample.seed, 7);
        assert_eq!(config.current_year, 2024);
        assert_eq!(config.bucket_name, "bucket");
        assert_eq!(config.model_key, "slot.bin");
    }
}
