//! Transformation stage
//!
//! Gated on a passed validation artifact. Derives the company-age feature,
//! drops excluded columns, remaps target labels through the closed outcome
//! enumeration, fits the preprocessor on train inputs only, transforms both
//! splits, rebalances each independently, and persists the matrices plus
//! the fitted procedure.

use crate::artifact::{IngestionArtifact, TransformationArtifact, ValidationArtifact};
use crate::config::PipelineConfig;
use crate::data::{DataFrame, Value};
use crate::error::{Error, Result};
use crate::label::Outcome;
use crate::preprocess::{CombinedResampler, Preprocessor};
use crate::schema::DataSchema;
use ndarray::Array2;
use tracing::info;

pub struct Transformation<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Transformation<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Fit, transform, rebalance and persist both splits
    pub fn run(
        &self,
        ingestion: &IngestionArtifact,
        validation: &ValidationArtifact,
    ) -> Result<TransformationArtifact> {
        if !validation.passed {
            return Err(Error::UpstreamValidation {
                message: validation.message.clone(),
            });
        }

        let schema = &self.config.schema;
        let train = DataFrame::read_csv(&ingestion.train_path)?;
        let test = DataFrame::read_csv(&ingestion.test_path)?;

        let (train_inputs, train_classes) =
            prepare_features(train, schema, self.config.current_year)?;
        let (test_inputs, test_classes) =
            prepare_features(test, schema, self.config.current_year)?;

        let preprocessor = Preprocessor::fit(&train_inputs, schema)?;
        let x_train = preprocessor.transform(&train_inputs)?;
        let x_test = preprocessor.transform(&test_inputs)?;
        info!(
            n_features = preprocessor.n_features(),
            "fitted preprocessor on train inputs"
        );

        let resampler = CombinedResampler::new(self.config.resample);
        let (x_train, train_classes) = resampler.fit_resample(&x_train, &train_classes);
        let (x_test, test_classes) = resampler.fit_resample(&x_test, &test_classes);
        info!(
            train_rows = x_train.nrows(),
            test_rows = x_test.nrows(),
            "rebalanced class distribution"
        );

        let preprocessor_path = self.config.preprocessor_path();
        let transformed_train_path = self.config.transformed_train_path();
        let transformed_test_path = self.config.transformed_test_path();

        crate::io::save_bincode(&preprocessor_path, &preprocessor)?;
        crate::io::save_matrix(&transformed_train_path, &append_labels(&x_train, &train_classes))?;
        crate::io::save_matrix(&transformed_test_path, &append_labels(&x_test, &test_classes))?;

        Ok(TransformationArtifact {
            preprocessor_path,
            transformed_train_path,
            transformed_test_path,
        })
    }
}

/// Derive company age, drop excluded columns, and split off the target
///
/// Shared contract with the evaluation stage, which re-derives features on
/// the raw test split the same way.
pub fn prepare_features(
    mut frame: DataFrame,
    schema: &DataSchema,
    current_year: i32,
) -> Result<(DataFrame, Vec<usize>)> {
    let target = frame.take_column(&schema.target_column)?;
    let classes = target_classes(&target, &schema.target_column)?;

    derive_company_age(&mut frame, schema, current_year)?;
    frame.drop_columns(&schema.drop_columns)?;

    Ok((frame, classes))
}

/// Append `company_age = current_year - establishment year`
pub fn derive_company_age(
    frame: &mut DataFrame,
    schema: &DataSchema,
    current_year: i32,
) -> Result<()> {
    let established = frame.numeric_column(&schema.established_column)?;
    let ages = established
        .iter()
        .map(|&year| Value::Num(f64::from(current_year) - year))
        .collect();
    frame.with_column(&schema.age_column, ages)
}

/// Map raw target values through the closed outcome enumeration
fn target_classes(values: &[Value], column: &str) -> Result<Vec<usize>> {
    values
        .iter()
        .map(|value| match value {
            Value::Str(label) => Ok(Outcome::parse(label)?.class()),
            Value::Null => Err(Error::MissingValue {
                column: column.to_string(),
            }),
            Value::Num(n) => Err(Error::UnknownLabel {
                label: n.to_string(),
            }),
        })
        .collect()
}

/// Transformed features with the class label as the final column
fn append_labels(x: &Array2<f64>, classes: &[usize]) -> Array2<f64> {
    let (n, d) = (x.nrows(), x.ncols());
    let mut out = Array2::zeros((n, d + 1));
    for (i, row) in x.rows().into_iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            out[[i, j]] = value;
        }
        out[[i, d]] = classes[i] as f64;
    }
    out
}
