//! Command-line interface
//!
//! `visado train` runs the full training pipeline against a CSV-backed
//! document store and a local object store; `visado predict` scores one
//! application with the promoted bundle.

use crate::config::PipelineConfig;
use crate::data::CsvDocumentStore;
use crate::error::Result;
use crate::model::SearchSpace;
use crate::pipeline::{PipelineOutcome, TrainPipeline};
use crate::predict::{Predictor, VisaApplication};
use crate::schema::DataSchema;
use crate::storage::{LocalObjectStore, ModelRegistry};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "visado", about = "Visa outcome training and inference pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the training pipeline end to end
    Train {
        /// Directory holding `<collection>.csv`
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Collection name to ingest
        #[arg(long, default_value = "usvisa")]
        collection: String,

        /// Dataset schema; the built-in visa schema is used when absent
        #[arg(long, default_value = "config/schema.yaml")]
        schema: PathBuf,

        /// Candidate search space
        #[arg(long, default_value = "config/model.yaml")]
        model_config: PathBuf,

        /// Root directory for run artifacts
        #[arg(long, default_value = "artifact")]
        artifact_dir: PathBuf,

        /// Local object-store directory standing in for the remote bucket
        #[arg(long, default_value = "model_store")]
        store_dir: PathBuf,

        /// Train/test split ratio override
        #[arg(long)]
        split_ratio: Option<f64>,

        /// RNG seed override
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Predict one application with the promoted model
    Predict {
        /// JSON file holding the application fields
        #[arg(long)]
        input: PathBuf,

        /// Local object-store directory holding the promoted model
        #[arg(long, default_value = "model_store")]
        store_dir: PathBuf,

        /// Dataset schema; the built-in visa schema is used when absent
        #[arg(long, default_value = "config/schema.yaml")]
        schema: PathBuf,
    },
}

/// Dispatch a parsed command line
pub fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Train {
            data_dir,
            collection,
            schema,
            model_config,
            artifact_dir,
            store_dir,
            split_ratio,
            seed,
        } => {
            let schema = load_schema(&schema)?;
            let search_space = load_search_space(&model_config)?;

            let mut config = PipelineConfig::new(artifact_dir, collection, schema, search_space);
            if let Some(ratio) = split_ratio {
                config = config.with_split_ratio(ratio);
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }

            let pipeline = TrainPipeline::new(
                config,
                Arc::new(CsvDocumentStore::new(data_dir)),
                Arc::new(LocalObjectStore::new(store_dir)),
            );

            match pipeline.run()? {
                PipelineOutcome::Promoted(pusher) => {
                    println!(
                        "model promoted to {}/{} (sha256 {})",
                        pusher.bucket, pusher.remote_key, pusher.digest
                    );
                }
                PipelineOutcome::Rejected(evaluation) => {
                    println!(
                        "model rejected, score delta {:.4}; promoted model unchanged",
                        evaluation.score_delta
                    );
                }
            }
            Ok(())
        }

        Command::Predict {
            input,
            store_dir,
            schema,
        } => {
            let schema = load_schema(&schema)?;
            let content = std::fs::read_to_string(&input)?;
            let application: VisaApplication = serde_json::from_str(&content)
                .map_err(|e| crate::error::Error::Schema {
                    message: format!("could not parse application {}: {e}", input.display()),
                })?;

            let registry = ModelRegistry::new(
                Arc::new(LocalObjectStore::new(store_dir)),
                "visado-models",
                crate::config::DEFAULT_MODEL_KEY,
            );
            let predictor = Predictor::new(registry, schema, Utc::now().year());
            let outcome = predictor.predict(&application)?;
            println!("{outcome}");
            Ok(())
        }
    }
}

fn load_schema(path: &PathBuf) -> Result<DataSchema> {
    if path.exists() {
        DataSchema::from_yaml_file(path)
    } else {
        Ok(DataSchema::visa())
    }
}

fn load_search_space(path: &PathBuf) -> Result<SearchSpace> {
    if path.exists() {
        SearchSpace::from_yaml_file(path)
    } else {
        Ok(default_search_space())
    }
}

/// Fallback candidate space, identical to the shipped `config/model.yaml`
fn default_search_space() -> SearchSpace {
    use crate::model::CandidateGrid;
    SearchSpace {
        expected_accuracy: 0.6,
        cv_folds: 5,
        seed: 42,
        candidates: vec![
            CandidateGrid::KNearest {
                n_neighbors: vec![3, 5, 7],
            },
            CandidateGrid::RandomForest {
                n_estimators: vec![25, 50],
                max_depth: vec![6, 10],
            },
            CandidateGrid::LogisticRegression {
                learning_rate: vec![0.1, 0.5],
                epochs: vec![300],
                l2: vec![0.0, 0.01],
            },
        ],
    }
}
