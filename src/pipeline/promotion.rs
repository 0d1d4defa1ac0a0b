//! Promotion stage
//!
//! Uploads the accepted bundle to the well-known remote key, overwriting
//! whatever is there. Only the orchestrator invokes this, and only when
//! evaluation accepted the new model.

use crate::artifact::{EvaluationArtifact, PusherArtifact};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::storage::ModelRegistry;
use tracing::info;

pub struct Promotion<'a> {
    config: &'a PipelineConfig,
    registry: &'a ModelRegistry,
}

impl<'a> Promotion<'a> {
    pub fn new(config: &'a PipelineConfig, registry: &'a ModelRegistry) -> Self {
        Self { config, registry }
    }

    /// Replace the promoted-model slot with the new bundle
    pub fn run(&self, evaluation: &EvaluationArtifact) -> Result<PusherArtifact> {
        let digest = self.registry.save_from_file(&evaluation.new_model_path)?;
        info!(
            bucket = %self.config.bucket_name,
            key = %evaluation.remote_model_key,
            "promoted new model"
        );

        Ok(PusherArtifact {
            bucket: self.config.bucket_name.clone(),
            remote_key: evaluation.remote_model_key.clone(),
            digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CandidateGrid, SearchSpace};
    use crate::schema::DataSchema;
    use crate::error::Error;
    use crate::storage::{compute_digest, InMemoryObjectStore, ObjectStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> PipelineConfig {
        let space = SearchSpace {
            expected_accuracy: 0.6,
            cv_folds: 3,
            seed: 42,
            candidates: vec![CandidateGrid::KNearest {
                n_neighbors: vec![3],
            }],
        };
        PipelineConfig::new(dir.path(), "visas", DataSchema::visa(), space)
    }

    fn evaluation(dir: &TempDir, config: &PipelineConfig) -> EvaluationArtifact {
        let model_path = dir.path().join("model.bin");
        std::fs::write(&model_path, b"bundle payload").unwrap();
        EvaluationArtifact {
            accepted: true,
            new_model_path: model_path,
            remote_model_key: config.model_key.clone(),
            score_delta: 0.1,
        }
    }

    #[test]
    fn test_uploads_to_well_known_key() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let store = Arc::new(InMemoryObjectStore::new());
        let registry = ModelRegistry::new(store.clone(), &config.bucket_name, &config.model_key);

        let artifact = Promotion::new(&config, &registry)
            .run(&evaluation(&dir, &config))
            .unwrap();

        assert_eq!(artifact.bucket, config.bucket_name);
        assert_eq!(artifact.remote_key, config.model_key);
        assert_eq!(artifact.digest, compute_digest(b"bundle payload"));
        assert_eq!(store.get(&config.model_key).unwrap(), b"bundle payload");
    }

    #[test]
    fn test_overwrites_previous_promotion() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let store = Arc::new(InMemoryObjectStore::new());
        store.put(&config.model_key, b"previous").unwrap();
        let registry = ModelRegistry::new(store.clone(), &config.bucket_name, &config.model_key);

        Promotion::new(&config, &registry)
            .run(&evaluation(&dir, &config))
            .unwrap();

        assert_eq!(store.get(&config.model_key).unwrap(), b"bundle payload");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_local_bundle_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let registry = ModelRegistry::new(
            Arc::new(InMemoryObjectStore::new()),
            &config.bucket_name,
            &config.model_key,
        );

        let mut evaluation = evaluation(&dir, &config);
        evaluation.new_model_path = dir.path().join("absent.bin");

        let err = Promotion::new(&config, &registry).run(&evaluation).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
