//! Descriptive statistics
//!
//! Variance and standard deviation are sample statistics (divisor n - 1).
//! Quantiles use linear interpolation between closest ranks with rank
//! `p * (n - 1)`. Skewness is the adjusted Fisher-Pearson coefficient.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicStatistics {
    /// 0 marks the empty-input sentinel; every other field is then 0
    pub count: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub skewness: f64,
}

impl BasicStatistics {
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let sorted = sorted(values);
        let n = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / n as f64;
        let variance = sample_variance(values, mean);

        Self {
            count: n,
            mean,
            variance,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[n - 1],
            sum,
            q1: percentile(&sorted, 0.25),
            median: percentile(&sorted, 0.5),
            q3: percentile(&sorted, 0.75),
            skewness: skewness(values, mean),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// std_dev / |mean|, 0 when the mean is 0
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean.abs()
        }
    }
}

pub(crate) fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Divisor n - 1; 0 for fewer than two values
pub(crate) fn sample_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Quantile `p` in [0, 1] of an ascending slice
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] + frac * (sorted[upper] - sorted[lower])
        }
    }
}

/// Population central moment of order `k`
pub(crate) fn central_moment(values: &[f64], mean: f64, k: i32) -> f64 {
    values.iter().map(|v| (v - mean).powi(k)).sum::<f64>() / values.len() as f64
}

/// Adjusted Fisher-Pearson G1; 0 below three values or without spread
pub(crate) fn skewness(values: &[f64], mean: f64) -> f64 {
    let n = values.len() as f64;
    if values.len() < 3 {
        return 0.0;
    }
    let m2 = central_moment(values, mean, 2);
    if m2 <= f64::EPSILON {
        return 0.0;
    }
    let g1 = central_moment(values, mean, 3) / m2.powf(1.5);
    g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
}

/// Sample excess kurtosis G2; 0 below four values or without spread
pub(crate) fn excess_kurtosis(values: &[f64], mean: f64) -> f64 {
    let n = values.len() as f64;
    if values.len() < 4 {
        return 0.0;
    }
    let m2 = central_moment(values, mean, 2);
    if m2 <= f64::EPSILON {
        return 0.0;
    }
    let g2 = central_moment(values, mean, 4) / (m2 * m2) - 3.0;
    ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
}
