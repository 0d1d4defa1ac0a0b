//! Object storage and the promoted-model registry

pub mod object;
pub mod registry;

pub use object::{InMemoryObjectStore, LocalObjectStore, ObjectStore, StorageError};
pub use registry::{compute_digest, ModelRegistry};
