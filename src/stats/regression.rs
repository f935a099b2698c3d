//! Ordinary least squares with intercept
//!
//! Solved through the SVD of the design matrix so that collinear predictors
//! show up as a rank deficiency instead of a blown-up inverse.

use crate::error::{AnalysisError, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Relative singular value cutoff for rank and solve
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionAnalysis {
    /// One slope per predictor
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    /// Residual standard error, sqrt(SSE / (n - p - 1))
    pub standard_error: f64,
    pub residuals: Vec<f64>,
    pub predicted: Vec<f64>,
    pub sample_size: usize,
}

impl RegressionAnalysis {
    /// `y = intercept + slope * x`
    pub fn simple(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(AnalysisError::invalid(format!(
                "regression needs equal-length series, got {} and {}",
                x.len(),
                y.len()
            )));
        }
        let rows: Vec<Vec<f64>> = x.iter().map(|&v| vec![v]).collect();
        Self::multiple(&rows, y)
    }

    /// `y = intercept + Σ b_j x_j`, one row of predictors per observation
    pub fn multiple(predictors: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        let n = y.len();
        if predictors.len() != n {
            return Err(AnalysisError::invalid(format!(
                "{} predictor rows for {} observations",
                predictors.len(),
                n
            )));
        }
        let p = predictors.first().map_or(0, |row| row.len());
        if p == 0 && n > 0 {
            return Err(AnalysisError::invalid("regression needs at least one predictor"));
        }
        if let Some((i, row)) = predictors.iter().enumerate().find(|(_, row)| row.len() != p) {
            return Err(AnalysisError::invalid(format!(
                "row {} has {} predictors, expected {}",
                i,
                row.len(),
                p
            )));
        }
        if n < p + 2 {
            return Err(AnalysisError::InsufficientData {
                needed: p + 2,
                actual: n,
            });
        }
        if y.iter().chain(predictors.iter().flatten()).any(|v| !v.is_finite()) {
            return Err(AnalysisError::failure("regression input contains non-finite values"));
        }

        let design = DMatrix::from_fn(n, p + 1, |i, j| if j == 0 { 1.0 } else { predictors[i][j - 1] });
        let target = DVector::from_column_slice(y);

        let svd = design.clone().svd(true, true);
        let max_singular = svd.singular_values.max();
        let eps = RANK_TOLERANCE * max_singular.max(1.0);
        if svd.rank(eps) < p + 1 {
            return Err(AnalysisError::failure(
                "predictors are collinear (rank-deficient design matrix)",
            ));
        }
        let beta = svd
            .solve(&target, eps)
            .map_err(|e| AnalysisError::failure(e.to_string()))?;

        let fitted = &design * &beta;
        let predicted: Vec<f64> = fitted.iter().copied().collect();
        let residuals: Vec<f64> = y.iter().zip(&predicted).map(|(a, b)| a - b).collect();

        let y_mean = y.iter().sum::<f64>() / n as f64;
        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
        let ss_tot: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
        let r_squared = if ss_tot > 0.0 {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        } else {
            // constant response is fitted exactly by the intercept
            1.0
        };

        let dof = (n - p - 1) as f64;
        let adjusted_r_squared = 1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / dof;
        let standard_error = (ss_res / dof).sqrt();

        Ok(Self {
            coefficients: beta.iter().skip(1).copied().collect(),
            intercept: beta[0],
            r_squared,
            adjusted_r_squared,
            standard_error,
            residuals,
            predicted,
            sample_size: n,
        })
    }

    /// Slope of a simple regression (first coefficient)
    pub fn slope(&self) -> f64 {
        self.coefficients.first().copied().unwrap_or(0.0)
    }

    pub fn predict(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(b, v)| b * v)
                .sum::<f64>()
    }
}
