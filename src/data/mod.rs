//! Tabular data handling and the document-store collaborator

pub mod document;
pub mod frame;

pub use document::{CsvDocumentStore, DocumentStore, InMemoryDocumentStore, Record};
pub use frame::{DataFrame, Value};
