//! Inference bundle
//!
//! Couples the fitted preprocessing procedure with the trained model so that
//! inference always replays the exact training-time transform before
//! predicting. The pairing is serialized as one unit; splitting it apart
//! would reintroduce train/serve skew.

use super::TrainedModel;
use crate::data::DataFrame;
use crate::error::{Error, Result};
use crate::label::Outcome;
use crate::preprocess::Preprocessor;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub preprocessor: Preprocessor,
    pub model: TrainedModel,
}

impl Bundle {
    pub fn new(preprocessor: Preprocessor, model: TrainedModel) -> Self {
        Self {
            preprocessor,
            model,
        }
    }

    /// Transform raw rows and predict class indices
    pub fn predict_classes(&self, frame: &DataFrame) -> Result<Vec<usize>> {
        let features = self.preprocessor.transform(frame)?;
        Ok(self.model.predict(&features))
    }

    /// Transform raw rows and predict outcome labels
    pub fn predict(&self, frame: &DataFrame) -> Result<Vec<Outcome>> {
        self.predict_classes(frame)?
            .into_iter()
            .map(|class| {
                Outcome::from_class(class).ok_or_else(|| Error::UnknownLabel {
                    label: class.to_string(),
                })
            })
            .collect()
    }

    /// Encode the bundle for storage
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a bundle fetched from storage
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }

    /// Persist the bundle to a local file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        crate::io::save_bincode(path, self)
    }

    /// Load a bundle from a local file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        crate::io::load_bincode(path)
    }
}
