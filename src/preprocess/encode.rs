//! Categorical encoders
//!
//! Both encoders learn their category vocabulary at fit time and reject
//! values unseen during fitting. The one-hot encoder emits one indicator
//! column per category; the ordinal encoder emits one column per input
//! column, with the category's index in sorted order.

use crate::data::DataFrame;
use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

fn sorted_unique(values: &[String]) -> Vec<String> {
    let mut categories = values.to_vec();
    categories.sort();
    categories.dedup();
    categories
}

fn category_index(categories: &[String], column: &str, value: &str) -> Result<usize> {
    categories
        .iter()
        .position(|c| c == value)
        .ok_or_else(|| Error::UnknownCategory {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// One-hot encoder over nominal columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Learn the category vocabulary of each column
    pub fn fit(frame: &DataFrame, columns: &[String]) -> Result<Self> {
        let categories = columns
            .iter()
            .map(|col| Ok(sorted_unique(&frame.string_column(col)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns: columns.to_vec(),
            categories,
        })
    }

    /// Total number of output columns
    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Indicator matrix for the fitted columns
    pub fn transform(&self, frame: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = frame.n_rows();
        let mut out = Array2::zeros((n_rows, self.width()));

        let mut offset = 0;
        for (col, categories) in self.columns.iter().zip(&self.categories) {
            let values = frame.string_column(col)?;
            for (row, value) in values.iter().enumerate() {
                let idx = category_index(categories, col, value)?;
                out[[row, offset + idx]] = 1.0;
            }
            offset += categories.len();
        }
        Ok(out)
    }
}

/// Ordinal encoder over ranked columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
}

impl OrdinalEncoder {
    /// Learn the category vocabulary of each column
    pub fn fit(frame: &DataFrame, columns: &[String]) -> Result<Self> {
        let categories = columns
            .iter()
            .map(|col| Ok(sorted_unique(&frame.string_column(col)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            columns: columns.to_vec(),
            categories,
        })
    }

    /// One output column per fitted column
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Category-index matrix for the fitted columns
    pub fn transform(&self, frame: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = frame.n_rows();
        let mut out = Array2::zeros((n_rows, self.width()));

        for (j, (col, categories)) in self.columns.iter().zip(&self.categories).enumerate() {
            let values = frame.string_column(col)?;
            for (row, value) in values.iter().enumerate() {
                out[[row, j]] = category_index(categories, col, value)? as f64;
            }
        }
        Ok(out)
    }
}
