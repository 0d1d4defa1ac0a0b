//! Visa application outcome prediction pipeline
//!
//! A sequential machine-learning pipeline: ingest records from a document
//! store, validate schema conformance, detect train/test drift, transform
//! features, train and select a classifier, evaluate it against the
//! currently promoted model, and conditionally promote it to an object
//! store. A lightweight prediction entrypoint serves single requests from
//! the promoted bundle.
//!
//! Every stage consumes the previous stage's typed artifact and produces a
//! new one; the orchestrator ([`pipeline::TrainPipeline`]) threads them
//! through in fixed order and short-circuits before promotion when the new
//! model does not beat the promoted one.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use visado::config::PipelineConfig;
//! use visado::data::CsvDocumentStore;
//! use visado::model::SearchSpace;
//! use visado::pipeline::TrainPipeline;
//! use visado::schema::DataSchema;
//! use visado::storage::LocalObjectStore;
//!
//! let space = SearchSpace::from_yaml_file("config/model.yaml").expect("search space");
//! let config = PipelineConfig::new("artifact", "usvisa", DataSchema::visa(), space);
//! let pipeline = TrainPipeline::new(
//!     config,
//!     Arc::new(CsvDocumentStore::new("data")),
//!     Arc::new(LocalObjectStore::new("model_store")),
//! );
//! let outcome = pipeline.run().expect("pipeline run");
//! println!("promoted: {}", outcome.promoted());
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod data;
pub mod drift;
pub mod error;
pub mod io;
pub mod label;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod predict;
pub mod preprocess;
pub mod schema;
pub mod storage;

pub use error::{Error, Result};
pub use label::Outcome;
pub use pipeline::{PipelineOutcome, TrainPipeline};
