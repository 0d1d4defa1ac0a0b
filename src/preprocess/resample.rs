//! Class rebalancing
//!
//! Combined over/under-sampling: synthetic minority oversampling brings the
//! minority class up to parity by interpolating between minority neighbours,
//! then edited-nearest-neighbour cleaning removes samples whose local
//! neighbourhood disagrees with their label. Applied independently to each
//! transformed split.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Oversampling + cleaning configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResampleConfig {
    /// Neighbours considered when synthesizing minority samples
    pub smote_neighbors: usize,
    /// Neighbours consulted by the cleaning vote
    pub enn_neighbors: usize,
    /// RNG seed for sample selection and interpolation
    pub seed: u64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            smote_neighbors: 5,
            enn_neighbors: 3,
            seed: 42,
        }
    }
}

/// Rebalances a transformed feature matrix and its labels
#[derive(Debug, Clone)]
pub struct CombinedResampler {
    config: ResampleConfig,
}

impl CombinedResampler {
    pub fn new(config: ResampleConfig) -> Self {
        Self { config }
    }

    /// Oversample the minority class, then clean noisy samples
    ///
    /// Returns the input unchanged when only one class is present.
    pub fn fit_resample(&self, x: &Array2<f64>, y: &[usize]) -> (Array2<f64>, Vec<usize>) {
        let mut rows: Vec<Vec<f64>> = x.rows().into_iter().map(|r| r.to_vec()).collect();
        let mut labels = y.to_vec();

        let class_0: Vec<usize> = indices_of(&labels, 0);
        let class_1: Vec<usize> = indices_of(&labels, 1);
        if class_0.is_empty() || class_1.is_empty() {
            return (x.clone(), labels);
        }

        let (minority_class, minority, majority_count) = if class_0.len() <= class_1.len() {
            (0, class_0, class_1.len())
        } else {
            (1, class_1, class_0.len())
        };

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.oversample(&mut rows, &mut labels, minority_class, &minority, majority_count, &mut rng);
        let (rows, labels) = self.clean(rows, labels);

        let n_cols = x.ncols();
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let resampled = Array2::from_shape_vec((rows.len(), n_cols), flat)
            .unwrap_or_else(|_| x.clone());
        (resampled, labels)
    }

    /// Interpolated synthetic samples until class parity
    fn oversample(
        &self,
        rows: &mut Vec<Vec<f64>>,
        labels: &mut Vec<usize>,
        minority_class: usize,
        minority: &[usize],
        majority_count: usize,
        rng: &mut StdRng,
    ) {
        let deficit = majority_count.saturating_sub(minority.len());
        if deficit == 0 || minority.len() < 2 {
            return;
        }
        let k = self.config.smote_neighbors.min(minority.len() - 1);

        for _ in 0..deficit {
            let anchor_idx = minority[rng.gen_range(0..minority.len())];
            let neighbors = nearest_among(rows, minority, anchor_idx, k);
            if neighbors.is_empty() {
                continue;
            }
            let neighbor_idx = neighbors[rng.gen_range(0..neighbors.len())];

            let gap: f64 = rng.gen();
            let synthetic: Vec<f64> = rows[anchor_idx]
                .iter()
                .zip(&rows[neighbor_idx])
                .map(|(&a, &b)| a + gap * (b - a))
                .collect();

            rows.push(synthetic);
            labels.push(minority_class);
        }
    }

    /// Edited-nearest-neighbour cleaning: drop samples whose neighbourhood
    /// vote disagrees with their label, never emptying a class
    fn clean(&self, rows: Vec<Vec<f64>>, labels: Vec<usize>) -> (Vec<Vec<f64>>, Vec<usize>) {
        let n = rows.len();
        if n <= self.config.enn_neighbors + 1 {
            return (rows, labels);
        }

        let all: Vec<usize> = (0..n).collect();
        let mut keep = vec![true; n];
        for i in 0..n {
            let neighbors = nearest_among(&rows, &all, i, self.config.enn_neighbors);
            let agreeing = neighbors.iter().filter(|&&j| labels[j] == labels[i]).count();
            if agreeing * 2 < neighbors.len() {
                keep[i] = false;
            }
        }

        // Keep a class alive even if every member was voted out
        for class in [0usize, 1] {
            let survives = labels
                .iter()
                .zip(&keep)
                .any(|(&l, &k)| k && l == class);
            if !survives {
                for (i, &label) in labels.iter().enumerate() {
                    if label == class {
                        keep[i] = true;
                    }
                }
            }
        }

        let mut kept_rows = Vec::new();
        let mut kept_labels = Vec::new();
        for i in 0..n {
            if keep[i] {
                kept_rows.push(rows[i].clone());
                kept_labels.push(labels[i]);
            }
        }
        (kept_rows, kept_labels)
    }
}

impl Default for CombinedResampler {
    fn default() -> Self {
        Self::new(ResampleConfig::default())
    }
}

fn indices_of(labels: &[usize], class: usize) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, &l)| l == class)
        .map(|(i, _)| i)
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| (x - y).powi(2)).sum()
}

/// The k nearest members of `pool` to `anchor`, excluding the anchor itself
fn nearest_among(rows: &[Vec<f64>], pool: &[usize], anchor: usize, k: usize) -> Vec<usize> {
    let mut candidates: Vec<(f64, usize)> = pool
        .iter()
        .filter(|&&i| i != anchor)
        .map(|&i| (squared_distance(&rows[anchor], &rows[i]), i))
        .collect();
    candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(k);
    candidates.into_iter().map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Two well-separated clusters, 1:4 imbalance
    fn imbalanced() -> (Array2<f64>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            rows.push(vec![f64::from(i % 5), f64::from(i % 7)]);
            labels.push(0);
        }
        for i in 0..10 {
            rows.push(vec![100.0 + f64::from(i % 3), 100.0 + f64::from(i % 4)]);
            labels.push(1);
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        (Array2::from_shape_vec((50, 2), flat).unwrap(), labels)
    }

    #[test]
    fn test_oversampling_reaches_parity_before_cleaning() {
        let (x, y) = imbalanced();
        let resampler = CombinedResampler::default();
        let (rx, ry) = resampler.fit_resample(&x, &y);

        let n0 = ry.iter().filter(|&&l| l == 0).count();
        let n1 = ry.iter().filter(|&&l| l == 1).count();
        // Clusters are well separated, so cleaning removes nothing and the
        // classes end balanced.
        assert_eq!(n0, n1);
        assert_eq!(rx.nrows(), ry.len());
    }

    #[test]
    fn test_synthetic_samples_interpolate_minority() {
        let (x, y) = imbalanced();
        let resampler = CombinedResampler::default();
        let (rx, ry) = resampler.fit_resample(&x, &y);

        for (row, &label) in rx.rows().into_iter().zip(&ry) {
            if label == 1 {
                // All minority samples, real and synthetic, stay inside the
                // minority cluster's bounding box.
                assert!(row[0] >= 100.0 && row[0] <= 102.0, "row {row:?}");
                assert!(row[1] >= 100.0 && row[1] <= 103.0, "row {row:?}");
            }
        }
    }

    #[test]
    fn test_single_class_passthrough() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let y = vec![1, 1, 1];
        let (rx, ry) = CombinedResampler::default().fit_resample(&x, &y);
        assert_eq!(rx, x);
        assert_eq!(ry, y);
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let (x, y) = imbalanced();
        let resampler = CombinedResampler::default();
        let (a_x, a_y) = resampler.fit_resample(&x, &y);
        let (b_x, b_y) = resampler.fit_resample(&x, &y);
        assert_eq!(a_x, b_x);
        assert_eq!(a_y, b_y);
    }

    #[test]
    fn test_cleaning_removes_noise() {
        // A lone class-1 point deep inside the class-0 cluster, with the
        // minority already at parity so oversampling is a no-op.
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            rows.push(vec![f64::from(i), 0.0]);
            labels.push(0);
        }
        for i in 0..9 {
            rows.push(vec![100.0 + f64::from(i), 0.0]);
            labels.push(1);
        }
        rows.push(vec![4.5, 0.0]); // noise: labelled 1, surrounded by 0
        labels.push(1);

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let x = Array2::from_shape_vec((20, 2), flat).unwrap();

        let (rx, ry) = CombinedResampler::default().fit_resample(&x, &labels);
        let has_noise = rx
            .rows()
            .into_iter()
            .zip(&ry)
            .any(|(row, &l)| l == 1 && row[0] < 50.0);
        assert!(!has_noise, "noisy sample should have been cleaned");
    }

    #[test]
    fn test_never_empties_a_class() {
        let (x, y) = imbalanced();
        let (_, ry) = CombinedResampler::default().fit_resample(&x, &y);
        assert!(ry.iter().any(|&l| l == 0));
        assert!(ry.iter().any(|&l| l == 1));
    }

    #[test]
    fn test_tiny_minority_skips_oversampling() {
        let x = Array2::from_shape_vec(
            (4, 1),
            vec![1.0, 2.0, 3.0, 100.0],
        )
        .unwrap();
        let y = vec![0, 0, 0, 1];
        let (rx, ry) = CombinedResampler::default().fit_resample(&x, &y);
        // One minority sample cannot be interpolated; nothing is added and
        // the tiny set is too small to clean.
        assert_eq!(rx.nrows(), 4);
        assert_eq!(ry, y);
    }
}
