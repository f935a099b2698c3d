//! Covariance, correlation and principal components
//!
//! Rows are observations, columns are variables. Eigenpairs of the sample
//! covariance come from nalgebra's symmetric eigen-decomposition, sorted by
//! descending eigenvalue. Each eigenvector is oriented so that its largest
//! magnitude component is positive, which makes projections reproducible.

use crate::error::{AnalysisError, Result};
use nalgebra::{DMatrix, SymmetricEigen};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultivariateStatistics {
    pub observations: usize,
    pub variables: usize,
    pub means: Vec<f64>,
    pub covariance_matrix: Vec<Vec<f64>>,
    pub correlation_matrix: Vec<Vec<f64>>,
    /// Descending
    pub eigenvalues: Vec<f64>,
    /// `eigenvectors[i]` belongs to `eigenvalues[i]`
    pub eigenvectors: Vec<Vec<f64>>,
    /// Number of components kept in `projection`
    pub components: usize,
    /// Centred data projected on the top components, one row per observation
    pub projection: Vec<Vec<f64>>,
    /// Share of total variance captured by the kept components
    pub explained_variance: f64,
    /// Per-component share of total variance
    pub explained_variance_ratios: Vec<f64>,
}

impl MultivariateStatistics {
    pub fn compute(rows: &[Vec<f64>], components: usize) -> Result<Self> {
        let n = rows.len();
        if n < 2 {
            return Err(AnalysisError::InsufficientData {
                needed: 2,
                actual: n,
            });
        }
        let p = rows[0].len();
        if p == 0 {
            return Err(AnalysisError::invalid("rows have no variables"));
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != p) {
            return Err(AnalysisError::invalid(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                p
            )));
        }
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(AnalysisError::failure("matrix contains non-finite values"));
        }

        let data = DMatrix::from_fn(n, p, |i, j| rows[i][j]);
        let means: Vec<f64> = (0..p).map(|j| data.column(j).mean()).collect();
        let centred = DMatrix::from_fn(n, p, |i, j| data[(i, j)] - means[j]);
        let covariance = (centred.transpose() * &centred) / (n as f64 - 1.0);

        let correlation = DMatrix::from_fn(p, p, |i, j| {
            if i == j {
                return 1.0;
            }
            let denom = (covariance[(i, i)] * covariance[(j, j)]).sqrt();
            if denom > 0.0 {
                (covariance[(i, j)] / denom).clamp(-1.0, 1.0)
            } else {
                0.0
            }
        });

        let (eigenvalues, eigenvectors) = sorted_eigen(covariance.clone())?;

        let k = components.min(p);
        let basis = DMatrix::from_fn(p, k, |i, j| eigenvectors[j][i]);
        let projected = &centred * basis;

        let trace = covariance.trace();
        let explained_variance_ratios: Vec<f64> = eigenvalues
            .iter()
            .map(|&v| if trace > 0.0 { v / trace } else { 0.0 })
            .collect();
        let explained_variance = explained_variance_ratios.iter().take(k).sum();

        Ok(Self {
            observations: n,
            variables: p,
            means,
            covariance_matrix: to_rows(&covariance),
            correlation_matrix: to_rows(&correlation),
            eigenvalues,
            eigenvectors,
            components: k,
            projection: to_rows(&projected),
            explained_variance,
            explained_variance_ratios,
        })
    }

    pub fn total_variance(&self) -> f64 {
        (0..self.variables).map(|i| self.covariance_matrix[i][i]).sum()
    }
}

/// Eigenpairs of a square symmetric matrix, descending, sign-normalised
pub fn eigen_decomposition(matrix: &[Vec<f64>]) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    let p = matrix.len();
    if p == 0 {
        return Err(AnalysisError::InsufficientData {
            needed: 1,
            actual: 0,
        });
    }
    if matrix.iter().any(|row| row.len() != p) {
        return Err(AnalysisError::invalid("matrix is not square"));
    }
    if matrix.iter().flatten().any(|v| !v.is_finite()) {
        return Err(AnalysisError::failure("matrix contains non-finite values"));
    }
    sorted_eigen(DMatrix::from_fn(p, p, |i, j| matrix[i][j]))
}

fn sorted_eigen(matrix: DMatrix<f64>) -> Result<(Vec<f64>, Vec<Vec<f64>>)> {
    let p = matrix.nrows();
    let eigen = SymmetricEigen::try_new(matrix, f64::EPSILON, 0)
        .ok_or_else(|| AnalysisError::failure("eigen-decomposition did not converge"))?;

    let mut order: Vec<usize> = (0..p).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let values = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let vectors = order
        .iter()
        .map(|&i| {
            let mut v: Vec<f64> = eigen.eigenvectors.column(i).iter().copied().collect();
            let pivot = v
                .iter()
                .copied()
                .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
            if pivot < 0.0 {
                v.iter_mut().for_each(|x| *x = -*x);
            }
            v
        })
        .collect();
    Ok((values, vectors))
}

fn to_rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    (0..m.nrows())
        .map(|i| m.row(i).iter().copied().collect())
        .collect()
}
