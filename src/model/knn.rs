//! K-nearest-neighbours classifier
//!
//! Stores the training set and votes among the k closest samples by
//! euclidean distance. Ties break toward the lower class index.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNearestClassifier {
    pub n_neighbors: usize,
    x_train: Vec<Vec<f64>>,
    y_train: Vec<usize>,
}

impl KNearestClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors: n_neighbors.max(1),
            x_train: Vec::new(),
            y_train: Vec::new(),
        }
    }

    /// Memorize the training set
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) {
        self.x_train = x.rows().into_iter().map(|r| r.to_vec()).collect();
        self.y_train = y.to_vec();
    }

    /// Majority vote among the k nearest training samples
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_one(&row.to_vec()))
            .collect()
    }

    fn predict_one(&self, features: &[f64]) -> usize {
        if self.x_train.is_empty() {
            return 0;
        }
        let mut distances: Vec<(f64, usize)> = self
            .x_train
            .iter()
            .zip(&self.y_train)
            .map(|(train_row, &label)| (squared_distance(features, train_row), label))
            .collect();
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let k = self.n_neighbors.min(distances.len());
        let positive_votes = distances[..k].iter().filter(|(_, l)| *l == 1).count();
        usize::from(positive_votes * 2 > k)
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| (x - y).powi(2)).sum()
}
