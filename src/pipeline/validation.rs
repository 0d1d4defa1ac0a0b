//! Validation stage
//!
//! Structural checks gate the pipeline: the column count must match the
//! schema and every declared column must exist in both splits. Drift is
//! computed only when structure passes, and is advisory: it lands in the
//! message and the persisted report but never flips `passed`. Failure to
//! compute drift at all is fatal.

use crate::artifact::{IngestionArtifact, ValidationArtifact};
use crate::config::PipelineConfig;
use crate::data::DataFrame;
use crate::drift::DriftDetector;
use crate::error::{Error, Result};
use tracing::info;

pub struct Validation<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Validation<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Check both splits and record a drift verdict
    pub fn run(&self, ingestion: &IngestionArtifact) -> Result<ValidationArtifact> {
        let train = DataFrame::read_csv(&ingestion.train_path)?;
        let test = DataFrame::read_csv(&ingestion.test_path)?;

        let mut messages = Vec::new();
        self.check_split(&train, "training", &mut messages);
        self.check_split(&test, "test", &mut messages);

        let passed = messages.is_empty();
        let drift_report_path = self.config.drift_report_path();

        let message = if passed {
            let detector = DriftDetector::new(self.config.drift);
            let report = detector
                .compare(&train, &test, &self.config.schema)
                .map_err(|e| Error::Validation {
                    message: format!("drift computation failed: {e}"),
                })?;
            crate::io::write_yaml(&drift_report_path, &report).map_err(|e| {
                Error::Validation {
                    message: format!("could not persist drift report: {e}"),
                }
            })?;

            info!(
                n_features = report.n_features,
                n_drifted = report.n_drifted,
                dataset_drift = report.dataset_drift,
                "drift report written"
            );
            if report.dataset_drift {
                format!(
                    "drift detected: {}/{} features drifted",
                    report.n_drifted, report.n_features
                )
            } else {
                format!(
                    "drift not detected: {}/{} features drifted",
                    report.n_drifted, report.n_features
                )
            }
        } else {
            let joined = messages.join(" ");
            info!(message = %joined, "structural validation failed");
            joined
        };

        Ok(ValidationArtifact {
            passed,
            message,
            drift_report_path,
        })
    }

    /// Column-count and column-existence checks for one split
    fn check_split(&self, frame: &DataFrame, split: &str, messages: &mut Vec<String>) {
        let schema = &self.config.schema;

        if frame.n_cols() != schema.column_count() {
            messages.push(format!(
                "{split} dataframe is missing columns: schema declares {}, found {}.",
                schema.column_count(),
                frame.n_cols()
            ));
        }

        let missing: Vec<&String> = schema
            .numerical_columns
            .iter()
            .chain(schema.categorical_columns.iter())
            .filter(|column| !frame.has_column(column))
            .collect();
        if !missing.is_empty() {
            messages.push(format!(
                "{split} dataframe is missing required columns: {missing:?}."
            ));
        }
    }
}
