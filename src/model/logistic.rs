//! Logistic regression classifier
//!
//! Batch gradient descent on the cross-entropy loss with optional L2
//! penalty. Deterministic: weights start at zero and the data order is
//! fixed, so refits reproduce bit-identical parameters.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2: f64,
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticRegression {
    pub fn new(learning_rate: f64, epochs: usize, l2: f64) -> Self {
        Self {
            learning_rate,
            epochs,
            l2,
            weights: Vec::new(),
            bias: 0.0,
        }
    }

    /// Fit weights on a feature matrix and 0/1 labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) {
        let n = x.nrows();
        let d = x.ncols();
        self.weights = vec![0.0; d];
        self.bias = 0.0;
        if n == 0 {
            return;
        }

        let scale = 1.0 / n as f64;
        for _ in 0..self.epochs {
            let mut grad_w = vec![0.0; d];
            let mut grad_b = 0.0;

            for (row, &label) in x.rows().into_iter().zip(y) {
                let error = sigmoid(self.margin(row)) - label as f64;
                for (g, &feature) in grad_w.iter_mut().zip(row) {
                    *g += error * feature;
                }
                grad_b += error;
            }

            for (w, g) in self.weights.iter_mut().zip(&grad_w) {
                *w -= self.learning_rate * (g * scale + self.l2 * *w);
            }
            self.bias -= self.learning_rate * grad_b * scale;
        }
    }

    fn margin(&self, row: ndarray::ArrayView1<'_, f64>) -> f64 {
        self.weights
            .iter()
            .zip(row)
            .map(|(&w, &f)| w * f)
            .sum::<f64>()
            + self.bias
    }

    /// Probability of the positive class per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Vec<f64> {
        x.rows()
            .into_iter()
            .map(|row| sigmoid(self.margin(row)))
            .collect()
    }

    /// Class predictions at the 0.5 threshold
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| usize::from(p >= 0.5))
            .collect()
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_data_learned() {
        // Positive class at x > 0, negative at x < 0
        let x = array![[-2.0], [-1.5], [-1.0], [-0.5], [0.5], [1.0], [1.5], [2.0]];
        let y = vec![0, 0, 0, 0, 1, 1, 1, 1];

        let mut model = LogisticRegression::new(0.5, 500, 0.0);
        model.fit(&x, &y);
        assert_eq!(model.predict(&x), y);
    }

    #[test]
    fn test_probabilities_ordered() {
        let x = array![[-2.0], [-1.0], [1.0], [2.0]];
        let y = vec![0, 0, 1, 1];
        let mut model = LogisticRegression::new(0.5, 300, 0.0);
        model.fit(&x, &y);

        let probs = model.predict_proba(&x);
        assert!(probs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_deterministic_refit() {
        let x = array![[-1.0, 0.5], [1.0, -0.5], [2.0, 1.0], [-2.0, -1.0]];
        let y = vec![0, 1, 1, 0];

        let mut a = LogisticRegression::new(0.1, 100, 0.01);
        let mut b = LogisticRegression::new(0.1, 100, 0.01);
        a.fit(&x, &y);
        b.fit(&x, &y);
        assert_eq!(a, b);
    }

    #[test]
    fn test_sigmoid_stable_at_extremes() {
        assert!(sigmoid(1000.0) <= 1.0);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_fit_predicts_positive_bias_free() {
        let mut model = LogisticRegression::new(0.1, 10, 0.0);
        model.fit(&Array2::zeros((0, 2)), &[]);
        let preds = model.predict(&array![[1.0, 1.0]]);
        assert_eq!(preds, vec![1]); // sigmoid(0) = 0.5 rounds to positive
    }
}
