//! Document store collaborator
//!
//! Ingestion pulls the raw dataset through this trait. Production deploys
//! point it at a document database; tests use the in-memory store and the
//! CLI reads collections from CSV files on disk.

use super::frame::{DataFrame, Value};
use crate::storage::StorageError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// One raw record, keyed by field name
pub type Record = BTreeMap<String, Value>;

/// Read access to a collection of records
pub trait DocumentStore: Send + Sync {
    /// Fetch every record of the named collection as a table
    fn fetch_records(&self, collection: &str) -> Result<DataFrame, StorageError>;
}

/// In-memory document store for tests
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<BTreeMap<String, Vec<Record>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert records into a collection, creating it if needed
    pub fn insert(&self, collection: &str, records: Vec<Record>) {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(records);
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn fetch_records(&self, collection: &str) -> Result<DataFrame, StorageError> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        let records = collections
            .get(collection)
            .ok_or_else(|| StorageError::NotFound(collection.to_string()))?;
        frame_from_records(records).map_err(|e| StorageError::Backend(e))
    }
}

/// Document store backed by one CSV file per collection
#[derive(Debug)]
pub struct CsvDocumentStore {
    root: PathBuf,
}

impl CsvDocumentStore {
    /// `root/<collection>.csv` holds each collection
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentStore for CsvDocumentStore {
    fn fetch_records(&self, collection: &str) -> Result<DataFrame, StorageError> {
        let path = self.root.join(format!("{collection}.csv"));
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        DataFrame::read_csv(&path).map_err(|e| StorageError::Backend(e.to_string()))
    }
}

/// Assemble a table from records sharing a key set
fn frame_from_records(records: &[Record]) -> Result<DataFrame, String> {
    let Some(first) = records.first() else {
        return Ok(DataFrame::new(Vec::new()));
    };

    let names: Vec<String> = first.keys().cloned().collect();
    let mut frame = DataFrame::new(names.clone());
    for record in records {
        let row: Vec<Value> = names
            .iter()
            .map(|name| record.get(name).cloned().unwrap_or(Value::Null))
            .collect();
        frame
            .push_row(row)
            .map_err(|e| format!("record does not match collection shape: {e}"))?;
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, Value)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_fetch_unknown_collection() {
        let store = InMemoryDocumentStore::new();
        let err = store.fetch_records("missing").unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_fetch_records_as_frame() {
        let store = InMemoryDocumentStore::new();
        store.insert(
            "visas",
            vec![
                record(&[
                    ("case_id", Value::Str("EZYV01".into())),
                    ("prevailing_wage", Value::Num(590.0)),
                ]),
                record(&[
                    ("case_id", Value::Str("EZYV02".into())),
                    ("prevailing_wage", Value::Num(830.5)),
                ]),
            ],
        );

        let frame = store.fetch_records("visas").unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert!(frame.has_column("case_id"));
        assert_eq!(
            frame.numeric_column("prevailing_wage").unwrap(),
            vec![590.0, 830.5]
        );
    }

    #[test]
    fn test_absent_field_becomes_null() {
        let store = InMemoryDocumentStore::new();
        store.insert(
            "visas",
            vec![
                record(&[("a", Value::Num(1.0)), ("b", Value::Num(2.0))]),
                record(&[("a", Value::Num(3.0))]),
            ],
        );

        let frame = store.fetch_records("visas").unwrap();
        assert_eq!(frame.column("b").unwrap()[1], Value::Null);
    }

    #[test]
    fn test_csv_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("visas.csv"),
            "case_id,prevailing_wage\nEZYV01,590\n",
        )
        .unwrap();

        let store = CsvDocumentStore::new(dir.path());
        let frame = store.fetch_records("visas").unwrap();
        assert_eq!(frame.n_rows(), 1);

        assert!(matches!(
            store.fetch_records("other").unwrap_err(),
            StorageError::NotFound(_)
        ));
    }
}
