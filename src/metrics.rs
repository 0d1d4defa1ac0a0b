//! Binary classification metrics
//!
//! Confusion-count based accuracy, precision, recall and F1 for the
//! two-class visa outcome. The positive class is Denied (class 1),
//! matching the fixed label mapping.

use crate::artifact::ClassificationMetrics;

/// Confusion counts for a binary problem, positive class = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryConfusion {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
}

impl BinaryConfusion {
    /// Count outcomes from aligned prediction/truth slices
    ///
    /// Slices must have the same length; classes other than {0, 1} do not
    /// occur in this pipeline and are counted as the negative class.
    pub fn from_predictions(y_pred: &[usize], y_true: &[usize]) -> Self {
        assert_eq!(
            y_pred.len(),
            y_true.len(),
            "predictions and targets must have same length"
        );

        let mut counts = Self {
            tp: 0,
            fp: 0,
            fn_: 0,
            tn: 0,
        };
        for (&pred, &truth) in y_pred.iter().zip(y_true.iter()) {
            match (pred == 1, truth == 1) {
                (true, true) => counts.tp += 1,
                (true, false) => counts.fp += 1,
                (false, true) => counts.fn_ += 1,
                (false, false) => counts.tn += 1,
            }
        }
        counts
    }

    /// Total number of samples
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    /// Fraction of correct predictions
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / total as f64
    }

    /// Fraction of positive predictions that were correct
    pub fn precision(&self) -> f64 {
        let denom = self.tp + self.fp;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    /// Fraction of true positives that were found
    pub fn recall(&self) -> f64 {
        let denom = self.tp + self.fn_;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    /// Harmonic mean of precision and recall
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Metrics record carried in the trainer artifact
    pub fn metrics(&self) -> ClassificationMetrics {
        ClassificationMetrics {
            f1: self.f1(),
            precision: self.precision(),
            recall: self.recall(),
        }
    }
}

/// F1 of predictions against truth, positive class = 1
pub fn f1_score(y_pred: &[usize], y_true: &[usize]) -> f64 {
    BinaryConfusion::from_predictions(y_pred, y_true).f1()
}

/// Accuracy of predictions against truth
pub fn accuracy_score(y_pred: &[usize], y_true: &[usize]) -> f64 {
    BinaryConfusion::from_predictions(y_pred, y_true).accuracy()
}
