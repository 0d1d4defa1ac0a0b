//! Training pipeline orchestrator
//!
//! Runs the stages in fixed order, threading each artifact into the next
//! stage. The single branch point sits after evaluation: an accepted model
//! is promoted, a rejected one stops the pipeline as a successful no-op.
//! Any stage error aborts the run immediately, tagged with the failing
//! stage and the original cause chained; nothing is retried or resumed.

use super::evaluation::Evaluation;
use super::ingestion::Ingestion;
use super::promotion::Promotion;
use super::training::Training;
use super::transformation::Transformation;
use super::validation::Validation;
use crate::artifact::{EvaluationArtifact, PusherArtifact};
use crate::config::PipelineConfig;
use crate::data::DocumentStore;
use crate::error::Result;
use crate::storage::{ModelRegistry, ObjectStore};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Pipeline states, entered strictly in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingesting,
    Validating,
    Transforming,
    Training,
    Evaluating,
    Pushing,
}

impl Stage {
    /// Stage name used in error reports and logs
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ingesting => "ingestion",
            Stage::Validating => "validation",
            Stage::Transforming => "transformation",
            Stage::Training => "training",
            Stage::Evaluating => "evaluation",
            Stage::Pushing => "promotion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal result of a completed run
///
/// Both variants are successful completions; `Rejected` is the intentional
/// no-op outcome when the new model did not beat the promoted one.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The new model was promoted to the remote slot
    Promoted(PusherArtifact),
    /// The new model lost the comparison; nothing was uploaded
    Rejected(EvaluationArtifact),
}

impl PipelineOutcome {
    pub fn promoted(&self) -> bool {
        matches!(self, PipelineOutcome::Promoted(_))
    }
}

/// The sequential training pipeline
///
/// Collaborator handles are injected at construction and live for the
/// pipeline's lifetime; no global client state is involved.
pub struct TrainPipeline {
    config: PipelineConfig,
    documents: Arc<dyn DocumentStore>,
    registry: ModelRegistry,
}

impl TrainPipeline {
    pub fn new(
        config: PipelineConfig,
        documents: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        let registry = ModelRegistry::new(objects, &config.bucket_name, &config.model_key);
        Self {
            config,
            documents,
            registry,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage to completion
    pub fn run(&self) -> Result<PipelineOutcome> {
        info!(run = %self.config.timestamp, "pipeline run started");

        info!(stage = %Stage::Ingesting, "entering stage");
        let ingestion = Ingestion::new(&self.config, self.documents.as_ref())
            .run()
            .map_err(|e| e.in_stage(Stage::Ingesting.as_str()))?;

        info!(stage = %Stage::Validating, "entering stage");
        let validation = Validation::new(&self.config)
            .run(&ingestion)
            .map_err(|e| e.in_stage(Stage::Validating.as_str()))?;
        info!(passed = validation.passed, message = %validation.message, "validation verdict");

        info!(stage = %Stage::Transforming, "entering stage");
        let transformation = Transformation::new(&self.config)
            .run(&ingestion, &validation)
            .map_err(|e| e.in_stage(Stage::Transforming.as_str()))?;

        info!(stage = %Stage::Training, "entering stage");
        let trainer = Training::new(&self.config)
            .run(&transformation)
            .map_err(|e| e.in_stage(Stage::Training.as_str()))?;

        info!(stage = %Stage::Evaluating, "entering stage");
        let evaluation = Evaluation::new(&self.config, &self.registry)
            .run(&ingestion, &trainer)
            .map_err(|e| e.in_stage(Stage::Evaluating.as_str()))?;

        if !evaluation.accepted {
            warn!(
                score_delta = evaluation.score_delta,
                "new model not accepted, stopping before promotion"
            );
            return Ok(PipelineOutcome::Rejected(evaluation));
        }

        info!(stage = %Stage::Pushing, "entering stage");
        let pusher = Promotion::new(&self.config, &self.registry)
            .run(&evaluation)
            .map_err(|e| e.in_stage(Stage::Pushing.as_str()))?;

        info!(
            bucket = %pusher.bucket,
            key = %pusher.remote_key,
            "pipeline run completed with promotion"
        );
        Ok(PipelineOutcome::Promoted(pusher))
    }
}
