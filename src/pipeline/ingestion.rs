//! Ingestion stage
//!
//! Pulls the full dataset from the document store, normalizes the missing
//! value sentinel, persists a feature-store snapshot for audit, and splits
//! rows into shuffled train/test partitions.

use crate::artifact::IngestionArtifact;
use crate::config::PipelineConfig;
use crate::data::{DataFrame, DocumentStore};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

/// Sentinel the source dataset uses for missing values
const MISSING_SENTINEL: &str = "na";

/// Identity column added by the document store
const IDENTITY_COLUMN: &str = "_id";

pub struct Ingestion<'a> {
    config: &'a PipelineConfig,
    documents: &'a dyn DocumentStore,
}

impl<'a> Ingestion<'a> {
    pub fn new(config: &'a PipelineConfig, documents: &'a dyn DocumentStore) -> Self {
        Self { config, documents }
    }

    /// Fetch, snapshot and split the dataset
    pub fn run(&self) -> Result<IngestionArtifact> {
        let ratio = self.config.train_test_split_ratio;
        if ratio <= 0.0 || ratio >= 1.0 {
            return Err(Error::Ingestion {
                message: format!("split ratio {ratio} is outside (0, 1)"),
            });
        }

        let mut frame = self.documents.fetch_records(&self.config.collection_name)?;
        info!(
            collection = %self.config.collection_name,
            rows = frame.n_rows(),
            columns = frame.n_cols(),
            "fetched collection"
        );

        if frame.has_column(IDENTITY_COLUMN) {
            frame.take_column(IDENTITY_COLUMN)?;
        }
        frame.replace_with_null(MISSING_SENTINEL);

        if frame.n_rows() < 2 {
            return Err(Error::Ingestion {
                message: format!(
                    "collection {:?} has {} rows, need at least 2 to split",
                    self.config.collection_name,
                    frame.n_rows()
                ),
            });
        }

        let snapshot_path = self.config.feature_store_path();
        frame.write_csv(&snapshot_path)?;
        info!(path = %snapshot_path.display(), "wrote feature store snapshot");

        let (train, test) = self.split(&frame);
        let train_path = self.config.train_path();
        let test_path = self.config.test_path();
        train.write_csv(&train_path)?;
        test.write_csv(&test_path)?;
        info!(
            train_rows = train.n_rows(),
            test_rows = test.n_rows(),
            "wrote train/test splits"
        );

        Ok(IngestionArtifact {
            train_path,
            test_path,
        })
    }

    /// Shuffled split at the configured test fraction
    ///
    /// Both partitions always end non-empty.
    fn split(&self, frame: &DataFrame) -> (DataFrame, DataFrame) {
        let n = frame.n_rows();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let n_test = ((n as f64 * self.config.train_test_split_ratio).round() as usize)
            .clamp(1, n - 1);

        let test = frame.select_rows(&indices[..n_test]);
        let train = frame.select_rows(&indices[n_test..]);
        (train, test)
    }
}
