//! Column-typed tabular data
//!
//! A small column-major table carrying the ingested dataset through the
//! pipeline. Cells are numeric, string, or null; CSV reading infers the
//! numeric/string split per cell and CSV writing is lossless for the values
//! the pipeline produces.

use crate::error::{Error, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A single cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Numeric cell
    Num(f64),
    /// String cell
    Str(String),
    /// Missing value
    Null,
}

impl Value {
    /// Numeric view of the cell, parsing numeric-looking strings
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Str(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }

    fn to_csv_field(&self) -> String {
        match self {
            Value::Num(n) => format!("{n}"),
            Value::Str(s) => s.clone(),
            Value::Null => String::new(),
        }
    }

    fn from_csv_field(field: &str) -> Value {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Value::Num(n),
            Err(_) => Value::Str(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Null => write!(f, "null"),
        }
    }
}

/// Column-major table with named columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl DataFrame {
    /// Create an empty table with the given column names
    pub fn new(names: Vec<String>) -> Self {
        let columns = vec![Vec::new(); names.len()];
        Self { names, columns }
    }

    /// Build a table from row-major data
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut frame = Self::new(names);
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    /// Column names in order
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Whether a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Borrow a column by name
    pub fn column(&self, name: &str) -> Result<&[Value]> {
        let idx = self.column_index(name)?;
        Ok(&self.columns[idx])
    }

    /// Append one row
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.names.len() {
            return Err(Error::RowShape {
                expected: self.names.len(),
                actual: row.len(),
            });
        }
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }
        Ok(())
    }

    /// Append a derived column
    pub fn with_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.n_rows() {
            return Err(Error::RowShape {
                expected: self.n_rows(),
                actual: values.len(),
            });
        }
        self.names.push(name.to_string());
        self.columns.push(values);
        Ok(())
    }

    /// Remove a column, returning its values
    pub fn take_column(&mut self, name: &str) -> Result<Vec<Value>> {
        let idx = self.column_index(name)?;
        self.names.remove(idx);
        Ok(self.columns.remove(idx))
    }

    /// Remove several columns
    pub fn drop_columns(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            self.take_column(name)?;
        }
        Ok(())
    }

    /// Numeric view of a column; nulls and non-numeric cells are errors
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.columns[idx]
            .iter()
            .map(|v| match v {
                Value::Null => Err(Error::MissingValue {
                    column: name.to_string(),
                }),
                other => other.as_num().ok_or_else(|| Error::NonNumeric {
                    column: name.to_string(),
                    value: other.to_string(),
                }),
            })
            .collect()
    }

    /// String view of a column; nulls are errors
    pub fn string_column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self.column_index(name)?;
        self.columns[idx]
            .iter()
            .map(|v| match v {
                Value::Null => Err(Error::MissingValue {
                    column: name.to_string(),
                }),
                other => Ok(other.to_string()),
            })
            .collect()
    }

    /// Replace a string sentinel (e.g. `"na"`) with null everywhere
    pub fn replace_with_null(&mut self, sentinel: &str) {
        for column in &mut self.columns {
            for value in column.iter_mut() {
                if matches!(value, Value::Str(s) if s == sentinel) {
                    *value = Value::Null;
                }
            }
        }
    }

    /// New table holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> DataFrame {
        let columns = self
            .columns
            .iter()
            .map(|col| indices.iter().map(|&i| col[i].clone()).collect())
            .collect();
        DataFrame {
            names: self.names.clone(),
            columns,
        }
    }

    /// Read a table from a headered CSV file
    pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path.as_ref())?;

        let names: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut frame = DataFrame::new(names);
        for record in reader.records() {
            let record = record?;
            let row = record.iter().map(Value::from_csv_field).collect();
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    /// Write the table as a headered CSV file, creating parent directories
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
        writer.write_record(&self.names)?;
        for row in 0..self.n_rows() {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|col| col[row].to_csv_field())
                .collect();
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
