//! Model selection
//!
//! The factory expands a YAML-configured grid of candidate models, scores
//! every combination by k-fold cross-validated accuracy, and refits the best
//! candidate on the full training matrix. Selection respects the acceptance
//! floor: when even the best candidate stays below `expected_accuracy`, the
//! search fails instead of returning a weak model.

use super::{KNearestClassifier, LogisticRegression, RandomForestClassifier, TrainedModel};
use crate::error::{Error, Result};
use crate::metrics::accuracy_score;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

fn default_cv_folds() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

/// Hyperparameter grid for one model family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum CandidateGrid {
    LogisticRegression {
        learning_rate: Vec<f64>,
        epochs: Vec<usize>,
        #[serde(default)]
        l2: Vec<f64>,
    },
    KNearest {
        n_neighbors: Vec<usize>,
    },
    RandomForest {
        n_estimators: Vec<usize>,
        max_depth: Vec<usize>,
    },
}

/// The configured candidate space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    /// Minimum cross-validated accuracy a model must reach to be usable
    pub expected_accuracy: f64,
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    pub candidates: Vec<CandidateGrid>,
}

impl SearchSpace {
    /// Load the search space from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// One concrete hyperparameter combination
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateParams {
    LogisticRegression {
        learning_rate: f64,
        epochs: usize,
        l2: f64,
    },
    KNearest {
        n_neighbors: usize,
    },
    RandomForest {
        n_estimators: usize,
        max_depth: usize,
    },
}

impl CandidateParams {
    fn fit(&self, x: &Array2<f64>, y: &[usize], seed: u64) -> TrainedModel {
        match *self {
            CandidateParams::LogisticRegression {
                learning_rate,
                epochs,
                l2,
            } => {
                let mut model = LogisticRegression::new(learning_rate, epochs, l2);
                model.fit(x, y);
                TrainedModel::Logistic(model)
            }
            CandidateParams::KNearest { n_neighbors } => {
                let mut model = KNearestClassifier::new(n_neighbors);
                model.fit(x, y);
                TrainedModel::KNearest(model)
            }
            CandidateParams::RandomForest {
                n_estimators,
                max_depth,
            } => {
                let mut model = RandomForestClassifier::new(n_estimators, max_depth, seed);
                model.fit(x, y);
                TrainedModel::Forest(model)
            }
        }
    }
}

impl fmt::Display for CandidateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateParams::LogisticRegression {
                learning_rate,
                epochs,
                l2,
            } => write!(
                f,
                "logistic_regression(learning_rate={learning_rate}, epochs={epochs}, l2={l2})"
            ),
            CandidateParams::KNearest { n_neighbors } => {
                write!(f, "k_nearest(n_neighbors={n_neighbors})")
            }
            CandidateParams::RandomForest {
                n_estimators,
                max_depth,
            } => write!(
                f,
                "random_forest(n_estimators={n_estimators}, max_depth={max_depth})"
            ),
        }
    }
}

/// Winner of a search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub model: TrainedModel,
    pub score: f64,
    pub label: String,
}

/// K-fold cross-validation splitter
///
/// Shuffles with a reproducible LCG so the same seed yields the same folds.
#[derive(Debug, Clone)]
pub struct KFold {
    n_splits: usize,
    seed: u64,
}

impl KFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self {
            n_splits: n_splits.max(2),
            seed,
        }
    }

    /// Train/test index pairs for each fold
    pub fn split(&self, n_samples: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
        let mut indices: Vec<usize> = (0..n_samples).collect();

        let mut rng_state = self.seed;
        for i in (1..n_samples).rev() {
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let j = (rng_state >> 33) as usize % (i + 1);
            indices.swap(i, j);
        }

        let n_splits = self.n_splits.min(n_samples.max(1));
        let fold_size = n_samples / n_splits;
        let remainder = n_samples % n_splits;

        let mut folds = Vec::with_capacity(n_splits);
        let mut start = 0;
        for i in 0..n_splits {
            let extra = usize::from(i < remainder);
            let end = start + fold_size + extra;

            let test: Vec<usize> = indices[start..end].to_vec();
            let train: Vec<usize> = indices[..start]
                .iter()
                .chain(indices[end..].iter())
                .copied()
                .collect();
            folds.push((train, test));
            start = end;
        }
        folds
    }
}

/// Grid search over the configured candidate space
#[derive(Debug, Clone)]
pub struct ModelFactory {
    space: SearchSpace,
}

impl ModelFactory {
    pub fn new(space: SearchSpace) -> Self {
        Self { space }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(SearchSpace::from_yaml_file(path)?))
    }

    /// Every concrete combination in the grid
    fn expand(&self) -> Vec<CandidateParams> {
        let mut params = Vec::new();
        for grid in &self.space.candidates {
            match grid {
                CandidateGrid::LogisticRegression {
                    learning_rate,
                    epochs,
                    l2,
                } => {
                    let l2 = if l2.is_empty() { vec![0.0] } else { l2.clone() };
                    for &lr in learning_rate {
                        for &ep in epochs {
                            for &penalty in &l2 {
                                params.push(CandidateParams::LogisticRegression {
                                    learning_rate: lr,
                                    epochs: ep,
                                    l2: penalty,
                                });
                            }
                        }
                    }
                }
                CandidateGrid::KNearest { n_neighbors } => {
                    for &k in n_neighbors {
                        params.push(CandidateParams::KNearest { n_neighbors: k });
                    }
                }
                CandidateGrid::RandomForest {
                    n_estimators,
                    max_depth,
                } => {
                    for &n in n_estimators {
                        for &depth in max_depth {
                            params.push(CandidateParams::RandomForest {
                                n_estimators: n,
                                max_depth: depth,
                            });
                        }
                    }
                }
            }
        }
        params
    }

    /// Mean cross-validated accuracy of one candidate
    fn cross_validate(&self, params: &CandidateParams, x: &Array2<f64>, y: &[usize]) -> f64 {
        let folds = KFold::new(self.space.cv_folds, self.space.seed).split(x.nrows());
        let mut scores = Vec::with_capacity(folds.len());

        for (train_idx, test_idx) in &folds {
            if train_idx.is_empty() || test_idx.is_empty() {
                continue;
            }
            let x_train = x.select(Axis(0), train_idx);
            let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();
            let x_test = x.select(Axis(0), test_idx);
            let y_test: Vec<usize> = test_idx.iter().map(|&i| y[i]).collect();

            let model = params.fit(&x_train, &y_train, self.space.seed);
            scores.push(accuracy_score(&model.predict(&x_test), &y_test));
        }

        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }

    /// Search the grid and refit the winner on the full matrix
    ///
    /// Fails with `NoAcceptableModel` when even the best candidate's
    /// cross-validated accuracy stays below the acceptance floor.
    pub fn select_best(&self, x: &Array2<f64>, y: &[usize]) -> Result<SearchOutcome> {
        let mut best: Option<(f64, CandidateParams)> = None;
        for params in self.expand() {
            let score = self.cross_validate(&params, x, y);
            debug!(candidate = %params, score, "cross-validated candidate");
            if best.as_ref().map_or(true, |(b, _)| score > *b) {
                best = Some((score, params));
            }
        }

        let Some((score, params)) = best else {
            return Err(Error::NoAcceptableModel {
                floor: self.space.expected_accuracy,
                best: 0.0,
                candidate: "no candidates configured".to_string(),
            });
        };
        if score < self.space.expected_accuracy {
            return Err(Error::NoAcceptableModel {
                floor: self.space.expected_accuracy,
                best: score,
                candidate: params.to_string(),
            });
        }

        let model = params.fit(x, y, self.space.seed);
        Ok(SearchOutcome {
            model,
            score,
            label: params.to_string(),
        })
    }
}
