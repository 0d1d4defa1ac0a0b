//! Dataset drift detection
//!
//! Two-sample comparison of the train and test splits, feature by feature:
//! - Kolmogorov-Smirnov test for numeric features
//! - Chi-square test for categorical features
//!
//! A feature drifts when its p-value falls below the configured
//! significance level; the dataset-level flag trips when the share of
//! drifted features exceeds `drift_share`. Drift is advisory: the
//! validation stage records it without failing the run.

use crate::data::DataFrame;
use crate::error::{Error, Result};
use crate::schema::DataSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Drift detection thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Per-feature significance level for both tests
    pub significance: f64,
    /// Fraction of drifted features above which the dataset drifts
    pub drift_share: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            significance: 0.05,
            drift_share: 0.5,
        }
    }
}

/// Statistical test applied to one feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftTest {
    /// Kolmogorov-Smirnov, numeric features
    Ks,
    /// Chi-square, categorical features
    ChiSquare,
}

/// Verdict for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDrift {
    pub feature: String,
    pub test: DriftTest,
    pub statistic: f64,
    pub p_value: f64,
    pub drifted: bool,
}

/// Persisted drift report for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub n_features: usize,
    pub n_drifted: usize,
    pub drift_share: f64,
    pub dataset_drift: bool,
    pub features: Vec<FeatureDrift>,
}

/// Compares feature distributions between two splits
#[derive(Debug, Clone, Default)]
pub struct DriftDetector {
    config: DriftConfig,
}

impl DriftDetector {
    pub fn new(config: DriftConfig) -> Self {
        Self { config }
    }

    /// Run both tests across all schema-declared features
    pub fn compare(
        &self,
        reference: &DataFrame,
        current: &DataFrame,
        schema: &DataSchema,
    ) -> Result<DriftReport> {
        if reference.n_rows() == 0 || current.n_rows() == 0 {
            return Err(Error::Validation {
                message: "cannot compute drift on an empty split".to_string(),
            });
        }

        let mut features = Vec::new();

        for column in &schema.numerical_columns {
            let baseline = reference.numeric_column(column)?;
            let observed = current.numeric_column(column)?;
            features.push(self.ks_test(column, &baseline, &observed));
        }

        for column in &schema.categorical_columns {
            let baseline = histogram(&reference.string_column(column)?);
            let observed = histogram(&current.string_column(column)?);
            features.push(self.chi_square_test(column, &baseline, &observed));
        }

        let n_features = features.len();
        let n_drifted = features.iter().filter(|f| f.drifted).count();
        let drift_share = if n_features == 0 {
            0.0
        } else {
            n_drifted as f64 / n_features as f64
        };

        Ok(DriftReport {
            n_features,
            n_drifted,
            drift_share,
            dataset_drift: drift_share > self.config.drift_share,
            features,
        })
    }

    /// Two-sample Kolmogorov-Smirnov test on a numeric feature
    fn ks_test(&self, feature: &str, baseline: &[f64], current: &[f64]) -> FeatureDrift {
        let mut sorted_baseline = baseline.to_vec();
        let mut sorted_current = current.to_vec();
        sorted_baseline.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted_current.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n1 = sorted_baseline.len() as f64;
        let n2 = sorted_current.len() as f64;

        // Maximum distance between the two empirical CDFs
        let mut d_max = 0.0f64;
        let mut i = 0usize;
        let mut j = 0usize;
        while i < sorted_baseline.len() && j < sorted_current.len() {
            let cdf1 = (i + 1) as f64 / n1;
            let cdf2 = (j + 1) as f64 / n2;
            d_max = d_max.max((cdf1 - cdf2).abs());

            if sorted_baseline[i] <= sorted_current[j] {
                i += 1;
            } else {
                j += 1;
            }
        }

        let n_eff = (n1 * n2) / (n1 + n2);
        let lambda = d_max * n_eff.sqrt();
        let p_value = ks_p_value(lambda);

        FeatureDrift {
            feature: feature.to_string(),
            test: DriftTest::Ks,
            statistic: d_max,
            p_value,
            drifted: p_value < self.config.significance,
        }
    }

    /// Chi-square test on a categorical feature
    fn chi_square_test(
        &self,
        feature: &str,
        baseline: &HashMap<String, usize>,
        current: &HashMap<String, usize>,
    ) -> FeatureDrift {
        let mut categories: Vec<&String> = baseline.keys().chain(current.keys()).collect();
        categories.sort();
        categories.dedup();

        let total_baseline: f64 = baseline.values().sum::<usize>() as f64;
        let total_current: f64 = current.values().sum::<usize>() as f64;

        let mut chi_sq = 0.0;
        let mut df: usize = 0;
        for category in categories {
            let observed = *current.get(category).unwrap_or(&0) as f64;
            let baseline_share = *baseline.get(category).unwrap_or(&0) as f64 / total_baseline;
            let expected = baseline_share * total_current;
            if expected > 0.0 {
                chi_sq += (observed - expected).powi(2) / expected;
                df += 1;
            }
        }
        df = df.saturating_sub(1);

        let p_value = chi_square_p_value(chi_sq, df);

        FeatureDrift {
            feature: feature.to_string(),
            test: DriftTest::ChiSquare,
            statistic: chi_sq,
            p_value,
            drifted: p_value < self.config.significance,
        }
    }
}

fn histogram(values: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for value in values {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}

/// Asymptotic p-value for the KS statistic
fn ks_p_value(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut p = 0.0;
    for k in 1..=100 {
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        let term = sign * (-2.0 * f64::from(k).powi(2) * lambda.powi(2)).exp();
        p += term;
        if term.abs() < 1e-10 {
            break;
        }
    }
    (2.0 * p).clamp(0.0, 1.0)
}

/// Chi-square upper-tail p-value via the Wilson-Hilferty approximation
fn chi_square_p_value(chi_sq: f64, df: usize) -> f64 {
    if df == 0 || chi_sq <= 0.0 {
        return 1.0;
    }
    let k = df as f64;
    let z = ((chi_sq / k).powf(1.0 / 3.0) - (1.0 - 2.0 / (9.0 * k))) / (2.0 / (9.0 * k)).sqrt();
    0.5 * (1.0 - erf(z / std::f64::consts::SQRT_2))
}

/// Abramowitz-Stegun error function approximation
fn erf(x: f64) -> f64 {
    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();

    sign * y
}
