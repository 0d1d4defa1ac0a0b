//! Random forest classifier
//!
//! Gini-impurity CART trees over bootstrap samples with square-root feature
//! subsampling at every split. Tree construction is seeded per tree, so the
//! whole ensemble is reproducible for a fixed seed.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const MIN_SAMPLES_SPLIT: usize = 4;

/// One tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, features: &[f64]) -> usize {
        match self {
            Node::Leaf { class } => *class,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if features[*feature] <= *threshold {
                    left.predict(features)
                } else {
                    right.predict(features)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub seed: u64,
    trees: Vec<Node>,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            max_depth: max_depth.max(1),
            seed,
            trees: Vec::new(),
        }
    }

    /// Grow the ensemble on a feature matrix and 0/1 labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &[usize]) {
        let rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
        self.trees.clear();
        if rows.is_empty() {
            return;
        }

        let n = rows.len();
        for tree_idx in 0..self.n_estimators {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(tree_idx as u64));
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let tree = grow(&rows, y, &sample, self.max_depth, &mut rng);
            self.trees.push(tree);
        }
    }

    /// Majority vote across trees
    pub fn predict(&self, x: &Array2<f64>) -> Vec<usize> {
        x.rows()
            .into_iter()
            .map(|row| {
                let features = row.to_vec();
                if self.trees.is_empty() {
                    return 0;
                }
                let positive = self
                    .trees
                    .iter()
                    .filter(|t| t.predict(&features) == 1)
                    .count();
                usize::from(positive * 2 > self.trees.len())
            })
            .collect()
    }
}

fn majority(y: &[usize], indices: &[usize]) -> usize {
    let positive = indices.iter().filter(|&&i| y[i] == 1).count();
    usize::from(positive * 2 > indices.len())
}

fn gini(y: &[usize], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let positive = indices.iter().filter(|&&i| y[i] == 1).count() as f64;
    let p = positive / indices.len() as f64;
    2.0 * p * (1.0 - p)
}

fn grow(
    rows: &[Vec<f64>],
    y: &[usize],
    indices: &[usize],
    depth_left: usize,
    rng: &mut StdRng,
) -> Node {
    let impurity = gini(y, indices);
    if depth_left == 0 || indices.len() < MIN_SAMPLES_SPLIT || impurity == 0.0 {
        return Node::Leaf {
            class: majority(y, indices),
        };
    }

    let n_features = rows[0].len();
    let n_tried = (n_features as f64).sqrt().ceil() as usize;
    let mut features: Vec<usize> = (0..n_features).collect();
    // Partial Fisher-Yates picks the feature subset
    for i in 0..n_tried.min(n_features) {
        let j = rng.gen_range(i..n_features);
        features.swap(i, j);
    }
    features.truncate(n_tried.min(n_features));

    let mut best: Option<(f64, usize, f64)> = None; // (weighted impurity, feature, threshold)
    for &feature in &features {
        let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feature]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| rows[i][feature] <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let weighted = (left.len() as f64 * gini(y, &left)
                + right.len() as f64 * gini(y, &right))
                / indices.len() as f64;
            if best.map_or(true, |(b, _, _)| weighted < b) {
                best = Some((weighted, feature, threshold));
            }
        }
    }

    match best {
        Some((weighted, feature, threshold)) if weighted < impurity => {
            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| rows[i][feature] <= threshold);
            Node::Split {
                feature,
                threshold,
                left: Box::new(grow(rows, y, &left_idx, depth_left - 1, rng)),
                right: Box::new(grow(rows, y, &right_idx, depth_left - 1, rng)),
            }
        }
        _ => Node::Leaf {
            class: majority(y, indices),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn separable(n: usize) -> (Array2<f64>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let offset = if i % 2 == 0 { 0.0 } else { 50.0 };
            rows.push(vec![offset + f64::from((i % 10) as u32), f64::from((i % 7) as u32)]);
            labels.push(usize::from(i % 2 == 1));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        (Array2::from_shape_vec((n, 2), flat).unwrap(), labels)
    }

    #[test]
    fn test_separable_data_learned() {
        let (x, y) = separable(60);
        let mut forest = RandomForestClassifier::new(15, 6, 42);
        forest.fit(&x, &y);
        assert_eq!(forest.predict(&x), y);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let (x, y) = separable(40);
        let mut a = RandomForestClassifier::new(10, 5, 7);
        let mut b = RandomForestClassifier::new(10, 5, 7);
        a.fit(&x, &y);
        b.fit(&x, &y);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_ensemble() {
        let (x, y) = separable(40);
        let mut a = RandomForestClassifier::new(10, 5, 1);
        let mut b = RandomForestClassifier::new(10, 5, 2);
        a.fit(&x, &y);
        b.fit(&x, &y);
        assert_ne!(a.trees, b.trees);
    }

    #[test]
    fn test_pure_node_becomes_leaf() {
        let x = Array2::from_shape_vec((4, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let y = vec![1, 1, 1, 1];
        let mut forest = RandomForestClassifier::new(3, 4, 0);
        forest.fit(&x, &y);
        assert_eq!(forest.predict(&x), y);
    }

    #[test]
    fn test_unfitted_defaults_to_negative() {
        let forest = RandomForestClassifier::new(3, 4, 0);
        let x = Array2::from_shape_vec((1, 1), vec![1.0]).unwrap();
        assert_eq!(forest.predict(&x), vec![0]);
    }

    #[test]
    fn test_params_clamped() {
        let forest = RandomForestClassifier::new(0, 0, 0);
        assert_eq!(forest.n_estimators, 1);
        assert_eq!(forest.max_depth, 1);
    }

    #[test]
    fn test_serde_round_trip() {
        let (x, y) = separable(30);
        let mut forest = RandomForestClassifier::new(5, 4, 3);
        forest.fit(&x, &y);

        let bytes = bincode::serialize(&forest).unwrap();
        let loaded: RandomForestClassifier = bincode::deserialize(&bytes).unwrap();
        assert_eq!(loaded, forest);
        assert_eq!(loaded.predict(&x), forest.predict(&x));
    }
}
