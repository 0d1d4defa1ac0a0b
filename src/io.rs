//! Artifact persistence helpers
//!
//! Binary artifacts (matrices, the fitted preprocessor, the model bundle)
//! are bincode-encoded; human-readable artifacts (drift report, schema,
//! search space) go through YAML. All writers create parent directories.

use crate::error::Result;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Serialize a value as a bincode file
pub fn save_bincode<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let data = bincode::serialize(value)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Deserialize a value from a bincode file
pub fn load_bincode<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let data = std::fs::read(path.as_ref())?;
    Ok(bincode::deserialize(&data)?)
}

/// Persist a transformed matrix
pub fn save_matrix(path: impl AsRef<Path>, matrix: &Array2<f64>) -> Result<()> {
    save_bincode(path, matrix)
}

/// Load a transformed matrix
pub fn load_matrix(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    load_bincode(path)
}

/// Serialize a value as a YAML file
pub fn write_yaml<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let content = serde_yaml::to_string(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Deserialize a value from a YAML file
pub fn read_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_yaml::from_str(&content)?)
}
