//! Training stage
//!
//! Loads the transformed matrices, grid-searches the configured candidate
//! space, scores the winner on the transformed test block, and persists the
//! preprocessor+model bundle as one inference-ready unit.

use crate::artifact::{TrainerArtifact, TransformationArtifact};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::metrics::BinaryConfusion;
use crate::model::{Bundle, ModelFactory};
use crate::preprocess::Preprocessor;
use ndarray::{Array2, Axis, Slice};
use tracing::info;

pub struct Training<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Training<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Select, score and bundle the best candidate model
    pub fn run(&self, transformation: &TransformationArtifact) -> Result<TrainerArtifact> {
        let train = crate::io::load_matrix(&transformation.transformed_train_path)?;
        let test = crate::io::load_matrix(&transformation.transformed_test_path)?;

        let (x_train, y_train) = split_labels(&train);
        let (x_test, y_test) = split_labels(&test);

        let factory = ModelFactory::new(self.config.search_space.clone());
        let outcome = factory.select_best(&x_train, &y_train)?;
        info!(
            candidate = %outcome.label,
            cv_score = outcome.score,
            "selected best model"
        );

        let confusion = BinaryConfusion::from_predictions(&outcome.model.predict(&x_test), &y_test);
        let metrics = confusion.metrics();
        info!(
            accuracy = confusion.accuracy(),
            f1 = metrics.f1,
            precision = metrics.precision,
            recall = metrics.recall,
            "scored selected model on transformed test block"
        );

        let preprocessor: Preprocessor =
            crate::io::load_bincode(&transformation.preprocessor_path)?;
        let bundle = Bundle::new(preprocessor, outcome.model);

        let model_path = self.config.model_path();
        bundle.save(&model_path)?;

        Ok(TrainerArtifact {
            model_path,
            metrics,
        })
    }
}

/// Split a stored matrix into its feature block and label column
fn split_labels(matrix: &Array2<f64>) -> (Array2<f64>, Vec<usize>) {
    let d = matrix.ncols().saturating_sub(1);
    let features = matrix.slice_axis(Axis(1), Slice::from(0..d)).to_owned();
    let labels = matrix
        .column(d)
        .iter()
        .map(|&v| usize::from(v >= 0.5))
        .collect();
    (features, labels)
}
