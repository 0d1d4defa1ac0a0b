//! Feature preprocessing
//!
//! The `Preprocessor` assembles the schema's column groups into one fitted,
//! serializable procedure: nominal columns are one-hot encoded, ranked
//! columns ordinal encoded, skewed numerics power transformed, remaining
//! numerics standard scaled. It is fitted on the train split only and
//! replayed verbatim at inference time by the model bundle, so transformed
//! feature layout is part of the train/serve contract.

pub mod encode;
pub mod resample;
pub mod scale;

pub use encode::{OneHotEncoder, OrdinalEncoder};
pub use resample::{CombinedResampler, ResampleConfig};
pub use scale::{PowerTransformer, StandardScaler};

use crate::data::DataFrame;
use crate::error::{Error, Result};
use crate::schema::DataSchema;
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted column-group preprocessing procedure
///
/// Output layout, in order: one-hot block, ordinal block, power block,
/// scale block. Columns the schema does not group are ignored, so tables
/// carrying extra columns (e.g. the raw establishment year at evaluation
/// time) transform cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    nominal: OneHotEncoder,
    ordinal: OrdinalEncoder,
    power: PowerTransformer,
    scale: StandardScaler,
    power_columns: Vec<String>,
    scale_columns: Vec<String>,
}

impl Preprocessor {
    /// Fit all column groups on the train split
    pub fn fit(frame: &DataFrame, schema: &DataSchema) -> Result<Self> {
        let nominal = OneHotEncoder::fit(frame, &schema.nominal_columns)?;
        let ordinal = OrdinalEncoder::fit(frame, &schema.ordinal_columns)?;
        let power = PowerTransformer::fit(&numeric_columns(frame, &schema.power_columns)?);
        let scale = StandardScaler::fit(&numeric_columns(frame, &schema.scale_columns)?);

        Ok(Self {
            nominal,
            ordinal,
            power,
            scale,
            power_columns: schema.power_columns.clone(),
            scale_columns: schema.scale_columns.clone(),
        })
    }

    /// Width of the transformed feature space
    pub fn n_features(&self) -> usize {
        self.nominal.width() + self.ordinal.width() + self.power.width() + self.scale.width()
    }

    /// Transform a table into the fitted feature space
    pub fn transform(&self, frame: &DataFrame) -> Result<Array2<f64>> {
        let blocks = [
            self.nominal.transform(frame)?,
            self.ordinal.transform(frame)?,
            self.power.transform(&numeric_columns(frame, &self.power_columns)?)?,
            self.scale.transform(&numeric_columns(frame, &self.scale_columns)?)?,
        ];
        let views: Vec<_> = blocks.iter().map(|block| block.view()).collect();
        concatenate(Axis(1), &views).map_err(|e| Error::Schema {
            message: format!("feature blocks misaligned: {e}"),
        })
    }
}

fn numeric_columns(frame: &DataFrame, names: &[String]) -> Result<Vec<Vec<f64>>> {
    names.iter().map(|n| frame.numeric_column(n)).collect()
}
