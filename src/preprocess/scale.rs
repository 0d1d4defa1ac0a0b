//! Numeric column transforms
//!
//! `StandardScaler` centers and scales columns to unit variance.
//! `PowerTransformer` applies the Yeo-Johnson transform with a per-column
//! lambda fitted by maximum likelihood (golden-section search), then
//! standardizes the result. Both fit on train data only.

use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64], mu: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

fn check_width(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::Schema {
            message: format!("transform got {actual} columns, fitted on {expected}"),
        });
    }
    Ok(())
}

/// Zero-mean, unit-variance scaling per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Learn per-column mean and standard deviation
    pub fn fit(columns: &[Vec<f64>]) -> Self {
        let means: Vec<f64> = columns.iter().map(|c| mean(c)).collect();
        let stds: Vec<f64> = columns
            .iter()
            .zip(&means)
            .map(|(c, &mu)| {
                let sd = population_std(c, mu);
                // Constant columns scale by 1 instead of dividing by zero
                if sd > 0.0 {
                    sd
                } else {
                    1.0
                }
            })
            .collect();
        Self { means, stds }
    }

    /// Number of fitted columns
    pub fn width(&self) -> usize {
        self.means.len()
    }

    /// Scale columns with the fitted statistics
    pub fn transform(&self, columns: &[Vec<f64>]) -> Result<Array2<f64>> {
        check_width(self.width(), columns.len())?;
        let n_rows = columns.first().map_or(0, Vec::len);
        let mut out = Array2::zeros((n_rows, self.width()));
        for (j, column) in columns.iter().enumerate() {
            for (i, &value) in column.iter().enumerate() {
                out[[i, j]] = (value - self.means[j]) / self.stds[j];
            }
        }
        Ok(out)
    }
}

/// Yeo-Johnson power transform with post-standardization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerTransformer {
    lambdas: Vec<f64>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl PowerTransformer {
    /// Fit a lambda per column by maximizing the Yeo-Johnson
    /// log-likelihood, then learn standardization statistics on the
    /// transformed values
    pub fn fit(columns: &[Vec<f64>]) -> Self {
        let mut lambdas = Vec::with_capacity(columns.len());
        let mut means = Vec::with_capacity(columns.len());
        let mut stds = Vec::with_capacity(columns.len());

        for column in columns {
            let lambda = optimize_lambda(column);
            let transformed: Vec<f64> = column.iter().map(|&x| yeo_johnson(x, lambda)).collect();
            let mu = mean(&transformed);
            let sd = population_std(&transformed, mu);
            lambdas.push(lambda);
            means.push(mu);
            stds.push(if sd > 0.0 { sd } else { 1.0 });
        }

        Self {
            lambdas,
            means,
            stds,
        }
    }

    /// Number of fitted columns
    pub fn width(&self) -> usize {
        self.lambdas.len()
    }

    /// Transform and standardize columns with the fitted parameters
    pub fn transform(&self, columns: &[Vec<f64>]) -> Result<Array2<f64>> {
        check_width(self.width(), columns.len())?;
        let n_rows = columns.first().map_or(0, Vec::len);
        let mut out = Array2::zeros((n_rows, self.width()));
        for (j, column) in columns.iter().enumerate() {
            for (i, &value) in column.iter().enumerate() {
                let t = yeo_johnson(value, self.lambdas[j]);
                out[[i, j]] = (t - self.means[j]) / self.stds[j];
            }
        }
        Ok(out)
    }
}

/// The Yeo-Johnson transform for one value
pub fn yeo_johnson(x: f64, lambda: f64) -> f64 {
    if x >= 0.0 {
        if lambda.abs() > 1e-12 {
            ((x + 1.0).powf(lambda) - 1.0) / lambda
        } else {
            (x + 1.0).ln()
        }
    } else if (lambda - 2.0).abs() > 1e-12 {
        -(((-x + 1.0).powf(2.0 - lambda)) - 1.0) / (2.0 - lambda)
    } else {
        -(-x + 1.0).ln()
    }
}

/// Yeo-Johnson log-likelihood for a candidate lambda
fn log_likelihood(values: &[f64], lambda: f64) -> f64 {
    let n = values.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let transformed: Vec<f64> = values.iter().map(|&x| yeo_johnson(x, lambda)).collect();
    let mu = mean(&transformed);
    let var = transformed.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / n;
    if var <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let jacobian: f64 = values
        .iter()
        .map(|&x| x.signum() * (x.abs() + 1.0).ln())
        .sum();
    -0.5 * n * var.ln() + (lambda - 1.0) * jacobian
}

/// Golden-section search for the likelihood-maximizing lambda in [-5, 5]
fn optimize_lambda(values: &[f64]) -> f64 {
    const GOLDEN: f64 = 0.618_033_988_749_895;
    let mut lo = -5.0;
    let mut hi = 5.0;
    let mut a = hi - GOLDEN * (hi - lo);
    let mut b = lo + GOLDEN * (hi - lo);
    let mut fa = log_likelihood(values, a);
    let mut fb = log_likelihood(values, b);

    for _ in 0..100 {
        if hi - lo < 1e-5 {
            break;
        }
        if fa > fb {
            hi = b;
            b = a;
            fb = fa;
            a = hi - GOLDEN * (hi - lo);
            fa = log_likelihood(values, a);
        } else {
            lo = a;
            a = b;
            fa = fb;
            b = lo + GOLDEN * (hi - lo);
            fb = log_likelihood(values, b);
        }
    }
    (lo + hi) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_scaler_zero_mean_unit_variance() {
        let columns = vec![vec![2.0, 4.0, 6.0, 8.0]];
        let scaler = StandardScaler::fit(&columns);
        let out = scaler.transform(&columns).unwrap();

        let values: Vec<f64> = out.column(0).to_vec();
        assert_relative_eq!(mean(&values), 0.0, epsilon = 1e-12);
        assert_relative_eq!(population_std(&values, 0.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scaler_constant_column() {
        let columns = vec![vec![3.0, 3.0, 3.0]];
        let scaler = StandardScaler::fit(&columns);
        let out = scaler.transform(&columns).unwrap();
        for &v in out.column(0) {
            assert_relative_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_scaler_width_mismatch() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]);
        let err = scaler
            .transform(&[vec![1.0], vec![2.0]])
            .unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }

    #[test]
    fn test_yeo_johnson_identity_at_lambda_one() {
        // lambda = 1 leaves non-negative values unchanged
        for x in [0.0, 0.5, 2.0, 100.0] {
            assert_relative_eq!(yeo_johnson(x, 1.0), x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_yeo_johnson_log_branches() {
        assert_relative_eq!(yeo_johnson(4.0, 0.0), 5.0f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(yeo_johnson(-4.0, 2.0), -(5.0f64.ln()), epsilon = 1e-12);
    }

    #[test]
    fn test_yeo_johnson_monotonic() {
        for lambda in [-2.0, -0.5, 0.0, 0.5, 1.0, 2.0, 3.0] {
            let mut prev = f64::NEG_INFINITY;
            for i in -20..=20 {
                let v = yeo_johnson(f64::from(i) / 2.0, lambda);
                assert!(v > prev, "not monotonic at lambda={lambda}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_power_transform_reduces_skew() {
        // Heavily right-skewed data
        let column: Vec<f64> = (1..200).map(|i| f64::from(i * i)).collect();
        let transformer = PowerTransformer::fit(&[column.clone()]);
        let out = transformer.transform(&[column]).unwrap();

        let values: Vec<f64> = out.column(0).to_vec();
        let mu = mean(&values);
        let sd = population_std(&values, mu);
        let skew =
            values.iter().map(|v| ((v - mu) / sd).powi(3)).sum::<f64>() / values.len() as f64;
        assert!(
            skew.abs() < 0.5,
            "skewness {skew} not reduced by power transform"
        );
    }

    #[test]
    fn test_power_transform_standardized() {
        let column: Vec<f64> = (0..100).map(|i| f64::from(i).exp2().min(1e6)).collect();
        let transformer = PowerTransformer::fit(&[column.clone()]);
        let out = transformer.transform(&[column]).unwrap();

        let values: Vec<f64> = out.column(0).to_vec();
        assert_relative_eq!(mean(&values), 0.0, epsilon = 1e-9);
        assert_relative_eq!(population_std(&values, mean(&values)), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_serde_round_trip() {
        let column: Vec<f64> = (0..50).map(|i| f64::from(i) * 1.5).collect();
        let transformer = PowerTransformer::fit(&[column.clone()]);

        let bytes = bincode::serialize(&transformer).unwrap();
        let loaded: PowerTransformer = bincode::deserialize(&bytes).unwrap();
        assert_eq!(loaded, transformer);
        assert_eq!(
            loaded.transform(&[column.clone()]).unwrap(),
            transformer.transform(&[column]).unwrap()
        );
    }

    proptest! {
        #[test]
        fn prop_fit_transform_deterministic(values in prop::collection::vec(-1e4f64..1e4, 5..40)) {
            let a = PowerTransformer::fit(&[values.clone()]);
            let b = PowerTransformer::fit(&[values.clone()]);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(
                a.transform(&[values.clone()]).unwrap(),
                b.transform(&[values]).unwrap()
            );
        }

        #[test]
        fn prop_scaler_bounded_output(values in prop::collection::vec(-1e6f64..1e6, 2..50)) {
            let scaler = StandardScaler::fit(&[values.clone()]);
            let out = scaler.transform(&[values.clone()]).unwrap();
            let n = values.len() as f64;
            for &v in out.column(0) {
                // |z| <= sqrt(n) for population-standardized data
                prop_assert!(v.abs() <= n.sqrt() + 1e-6);
            }
        }
    }
}
