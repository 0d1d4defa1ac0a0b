//! visado CLI
//!
//! # Usage
//!
//! ```bash
//! # Train from data/usvisa.csv and promote into model_store/
//! visado train
//!
//! # Train with overrides
//! visado train --data-dir data --collection usvisa --split-ratio 0.25 --seed 7
//!
//! # Predict one application
//! visado predict --input application.json
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use visado::cli::{run_command, Cli};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
