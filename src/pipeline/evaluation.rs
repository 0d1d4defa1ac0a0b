//! Evaluation stage
//!
//! Scores the candidate for promotion against the currently promoted model
//! on the raw, un-resampled test split. Feature derivation deliberately
//! mirrors the transformation stage rather than reusing its matrices: the
//! rebalanced test matrix contains synthetic samples, and promoted models
//! must be compared on real data only. A missing promoted model is not an
//! error; its baseline score is zero, and any positive F1 wins.

use crate::artifact::{EvaluationArtifact, IngestionArtifact, TrainerArtifact};
use crate::config::PipelineConfig;
use crate::data::DataFrame;
use crate::error::Result;
use crate::metrics::f1_score;
use crate::pipeline::transformation::prepare_features;
use crate::storage::ModelRegistry;
use tracing::info;

pub struct Evaluation<'a> {
    config: &'a PipelineConfig,
    registry: &'a ModelRegistry,
}

impl<'a> Evaluation<'a> {
    pub fn new(config: &'a PipelineConfig, registry: &'a ModelRegistry) -> Self {
        Self { config, registry }
    }

    /// Compare the new model's F1 against the promoted baseline
    pub fn run(
        &self,
        ingestion: &IngestionArtifact,
        trainer: &TrainerArtifact,
    ) -> Result<EvaluationArtifact> {
        let test = DataFrame::read_csv(&ingestion.test_path)?;
        let (inputs, classes) =
            prepare_features(test, &self.config.schema, self.config.current_year)?;

        let new_f1 = trainer.metrics.f1;

        let baseline_f1 = if self.registry.is_model_present()? {
            let promoted = self.registry.load()?;
            let predictions = promoted.predict_classes(&inputs)?;
            let score = f1_score(&predictions, &classes);
            info!(baseline_f1 = score, "scored promoted model on raw test split");
            score
        } else {
            info!("no promoted model found, baseline F1 defaults to 0");
            0.0
        };

        let score_delta = new_f1 - baseline_f1;
        let accepted = new_f1 > baseline_f1;
        info!(new_f1, baseline_f1, score_delta, accepted, "evaluation verdict");

        Ok(EvaluationArtifact {
            accepted,
            new_model_path: trainer.model_path.clone(),
            remote_model_key: self.config.model_key.clone(),
            score_delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ClassificationMetrics;
    use crate::data::Value;
    use crate::model::{Bundle, CandidateGrid, KNearestClassifier, SearchSpace, TrainedModel};
    use crate::preprocess::Preprocessor;
    use crate::schema::DataSchema;
    use crate::storage::{InMemoryObjectStore, ObjectStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn schema_small() -> DataSchema {
        let mut schema = DataSchema::visa();
        schema.columns = vec![
            "region".into(),
            "yr_of_estab".into(),
            "prevailing_wage".into(),
            "case_status".into(),
        ];
        schema.numerical_columns = vec!["yr_of_estab".into(), "prevailing_wage".into()];
        schema.categorical_columns = vec!["region".into(), "case_status".into()];
        schema.nominal_columns = vec!["region".into()];
        schema.ordinal_columns = vec![];
        schema.power_columns = vec!["company_age".into()];
        schema.scale_columns = vec!["prevailing_wage".into()];
        schema.drop_columns = vec!["yr_of_estab".into()];
        schema.target_column = "case_status".into();
        schema
    }

    fn config(dir: &TempDir) -> PipelineConfig {
        let space = SearchSpace {
            expected_accuracy: 0.6,
            cv_folds: 3,
            seed: 42,
            candidates: vec![CandidateGrid::KNearest {
                n_neighbors: vec![1],
            }],
        };
        PipelineConfig::new(dir.path(), "visas", schema_small(), space).with_current_year(2024)
    }

    fn test_split(n: usize) -> DataFrame {
        let rows = (0..n)
            .map(|i| {
                let denied = i % 2 == 0;
                vec![
                    Value::Str(if i % 3 == 0 { "West" } else { "South" }.into()),
                    Value::Num(2000.0 + f64::from((i % 20) as u32)),
                    Value::Num(if denied { 100.0 } else { 900.0 } + f64::from((i % 10) as u32)),
                    Value::Str(if denied { "Denied" } else { "Certified" }.into()),
                ]
            })
            .collect();
        DataFrame::from_rows(
            vec![
                "region".into(),
                "yr_of_estab".into(),
                "prevailing_wage".into(),
                "case_status".into(),
            ],
            rows,
        )
        .unwrap()
    }

    fn ingestion_artifact(dir: &TempDir, n: usize) -> IngestionArtifact {
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        test_split(n).write_csv(&train_path).unwrap();
        test_split(n).write_csv(&test_path).unwrap();
        IngestionArtifact {
            train_path,
            test_path,
        }
    }

    fn trainer_artifact(dir: &TempDir, f1: f64) -> TrainerArtifact {
        TrainerArtifact {
            model_path: dir.path().join("model.bin"),
            metrics: ClassificationMetrics {
                f1,
                precision: f1,
                recall: f1,
            },
        }
    }

    /// A bundle that scores perfectly on the synthetic test split
    fn perfect_bundle(schema: &DataSchema) -> Bundle {
        let frame = test_split(40);
        let (inputs, classes) = prepare_features(frame, schema, 2024).unwrap();
        let preprocessor = Preprocessor::fit(&inputs, schema).unwrap();
        let x = preprocessor.transform(&inputs).unwrap();
        let mut knn = KNearestClassifier::new(1);
        knn.fit(&x, &classes);
        Bundle::new(preprocessor, TrainedModel::KNearest(knn))
    }

    #[test]
    fn test_no_promoted_model_accepts_any_positive_f1() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let registry = ModelRegistry::new(
            Arc::new(InMemoryObjectStore::new()),
            &config.bucket_name,
            &config.model_key,
        );

        let artifact = Evaluation::new(&config, &registry)
            .run(&ingestion_artifact(&dir, 30), &trainer_artifact(&dir, 0.75))
            .unwrap();

        assert!(artifact.accepted);
        assert_eq!(artifact.score_delta, 0.75);
        assert_eq!(artifact.remote_model_key, config.model_key);
    }

    #[test]
    fn test_weaker_new_model_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let store = Arc::new(InMemoryObjectStore::new());
        store
            .put(
                &config.model_key,
                &perfect_bundle(&config.schema).to_bytes().unwrap(),
            )
            .unwrap();
        let registry = ModelRegistry::new(store, &config.bucket_name, &config.model_key);

        // Promoted model scores F1 = 1.0 on this split; the new one claims 0.78
        let artifact = Evaluation::new(&config, &registry)
            .run(&ingestion_artifact(&dir, 30), &trainer_artifact(&dir, 0.78))
            .unwrap();

        assert!(!artifact.accepted);
        assert!(artifact.score_delta < 0.0);
    }

    #[test]
    fn test_tie_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);

        let store = Arc::new(InMemoryObjectStore::new());
        store
            .put(
                &config.model_key,
                &perfect_bundle(&config.schema).to_bytes().unwrap(),
            )
            .unwrap();
        let registry = ModelRegistry::new(store, &config.bucket_name, &config.model_key);

        // Promoted baseline is exactly 1.0; an equal score must not promote
        let artifact = Evaluation::new(&config, &registry)
            .run(&ingestion_artifact(&dir, 30), &trainer_artifact(&dir, 1.0))
            .unwrap();

        assert!(!artifact.accepted);
        assert_eq!(artifact.score_delta, 0.0);
    }

    #[test]
    fn test_zero_f1_without_baseline_rejected() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let registry = ModelRegistry::new(
            Arc::new(InMemoryObjectStore::new()),
            &config.bucket_name,
            &config.model_key,
        );

        let artifact = Evaluation::new(&config, &registry)
            .run(&ingestion_artifact(&dir, 30), &trainer_artifact(&dir, 0.0))
            .unwrap();

        // Strictly-greater comparison: 0 > 0 is false
        assert!(!artifact.accepted);
    }
}
