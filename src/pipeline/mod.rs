//! The sequential training pipeline
//!
//! Six stages, each consuming the previous stage's artifact:
//! ingestion → validation → transformation → training → evaluation →
//! promotion, orchestrated by [`TrainPipeline`].

pub mod evaluation;
pub mod ingestion;
pub mod orchestrator;
pub mod promotion;
pub mod training;
pub mod transformation;
pub mod validation;

pub use evaluation::Evaluation;
pub use ingestion::Ingestion;
pub use orchestrator::{PipelineOutcome, Stage, TrainPipeline};
pub use promotion::Promotion;
pub use training::Training;
pub use transformation::Transformation;
pub use validation::Validation;
