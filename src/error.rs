//! Error types for the visado pipeline
//!
//! Every stage wraps lower-level failures into one of these kinds and
//! propagates with `?`. The orchestrator tags the failing stage; only the
//! binary turns an error into an exit report.

use crate::storage::StorageError;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a pipeline run
#[derive(Debug, Error)]
pub enum Error {
    /// Source collection empty or split ratio out of range
    #[error("ingestion failed: {message}")]
    Ingestion { message: String },

    /// Drift computation could not complete
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Transformation invoked on a failed validation artifact
    #[error("upstream validation failed: {message}")]
    UpstreamValidation { message: String },

    /// Target value outside the closed {Certified, Denied} mapping
    #[error("unknown target label: {label:?}")]
    UnknownLabel { label: String },

    /// Category unseen at fit time fed to a fitted encoder
    #[error("unknown category {value:?} in column {column:?}")]
    UnknownCategory { column: String, value: String },

    /// No candidate cleared the acceptance floor
    #[error("no model reached the acceptance floor {floor}: best was {best:.4} ({candidate})")]
    NoAcceptableModel {
        floor: f64,
        best: f64,
        candidate: String,
    },

    /// Remote store unreachable or object missing when required
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Schema file malformed or internally inconsistent
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Referenced column absent from a table
    #[error("column {name:?} not found")]
    ColumnNotFound { name: String },

    /// Declared-numeric column holding a non-numeric value
    #[error("column {column:?} is not numeric: {value:?}")]
    NonNumeric { column: String, value: String },

    /// Row length does not match the table header
    #[error("row has {actual} values, table has {expected} columns")]
    RowShape { expected: usize, actual: usize },

    /// Null cell in a column that requires a value
    #[error("missing value in column {column:?}")]
    MissingValue { column: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Binary artifact encoding/decoding error
    #[error("serialization error: {0}")]
    Encode(#[from] bincode::Error),

    /// A pipeline stage failed; the original cause is chained
    #[error("{stage} stage failed")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap this error with the name of the stage it surfaced in
    pub fn in_stage(self, stage: &'static str) -> Self {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Name of the failing stage, if this error was stage-tagged
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Error::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// Whether this error is the intentional short-circuit gate
    /// (transformation refusing to run on failed validation)
    pub fn is_upstream_gate(&self) -> bool {
        match self {
            Error::UpstreamValidation { .. } => true,
            Error::Stage { source, .. } => source.is_upstream_gate(),
            _ => false,
        }
    }
}
