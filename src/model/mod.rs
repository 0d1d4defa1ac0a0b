//! Candidate classifiers, model selection, and the inference bundle

pub mod bundle;
pub mod factory;
pub mod forest;
pub mod knn;
pub mod logistic;

pub use bundle::Bundle;
pub use factory::{CandidateGrid, CandidateParams, KFold, ModelFactory, SearchOutcome, SearchSpace};
pub use forest::RandomForestClassifier;
pub use knn::KNearestClassifier;
pub use logistic::LogisticRegression;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// A fitted classifier of any supported family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainedModel {
    Logistic(LogisticRegression),
    KNearest(KNearestClassifier),
    Forest(RandomForestClassifier),
}

impl TrainedModel {
    /// Class predictions for a transformed feature matrix
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        match self {
            TrainedModel::Logistic(model) => model.predict(x),
            TrainedModel::KNearest(model) => model.predict(x),
            TrainedModel::Forest(model) => model.predict(x),
        }
    }

    /// Model family name
    pub fn kind(&self) -> &'static str {
        match self {
            TrainedModel::Logistic(_) => "logistic_regression",
            TrainedModel::KNearest(_) => "k_nearest",
            TrainedModel::Forest(_) => "random_forest",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_kind_names() {
        let mut knn = KNearestClassifier::new(1);
        knn.fit(&array![[0.0], [1.0]], &[0, 1]);
        let model = TrainedModel::KNearest(knn);
        assert_eq!(model.kind(), "k_nearest");
        assert_eq!(model.predict(&array![[0.1]]), vec![0]);
    }
}
