//! Feature standardization
//!
//! Wide third-party feature exports contain infinities and wildly different
//! scales. Rows are sanitized (±∞ clamped to the `f32` range, NaN zeroed)
//! and then centered and scaled per column.

use crate::models::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};

/// Replace non-finite values with finite stand-ins
pub fn sanitize_row(row: &[f64]) -> Vec<f64> {
    row.iter().map(|&v| sanitize_value(v)).collect()
}

/// Sanitize every row of a matrix in place
pub fn sanitize_matrix(rows: &mut [Vec<f64>]) {
    for row in rows.iter_mut() {
        for v in row.iter_mut() {
            *v = sanitize_value(*v);
        }
    }
}

fn sanitize_value(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else if v == f64::INFINITY {
        f64::from(f32::MAX)
    } else if v == f64::NEG_INFINITY {
        f64::from(f32::MIN)
    } else {
        v
    }
}

/// Per-column standardization to zero mean and unit variance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Learn column means and standard deviations
    ///
    /// Columns with zero variance keep a scale of 1 so they are only centered.
    pub fn fit(rows: &[Vec<f64>]) -> ModelResult<Self> {
        let first = rows.first().ok_or(ModelError::EmptyInput)?;
        let dim = first.len();
        let n = rows.len() as f64;

        let mut means = vec![0.0; dim];
        for row in rows {
            if row.len() != dim {
                return Err(ModelError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
            for (m, &v) in means.iter_mut().zip(row) {
                *m += sanitize_value(v) / n;
            }
        }

        let mut variances = vec![0.0; dim];
        for row in rows {
            for ((var, &v), &m) in variances.iter_mut().zip(row).zip(&means) {
                let d = sanitize_value(v) - m;
                *var += d * d / n;
            }
        }

        let scales = variances
            .into_iter()
            .map(|var| {
                let std = var.sqrt();
                if std.is_finite() && std > 0.0 { std } else { 1.0 }
            })
            .collect();

        Ok(Self { means, scales })
    }

    /// Number of columns the scaler was fitted on
    pub fn dim(&self) -> usize {
        self.means.len()
    }

    /// Standardize one row
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(&v, (&m, &s))| sanitize_value((sanitize_value(v) - m) / s))
            .collect()
    }

    /// Standardize a matrix
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}
