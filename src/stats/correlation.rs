//! Pearson correlation with a two-tailed t-test
//!
//! Strength cut points on |r|: < 0.1 negligible, < 0.3 weak, < 0.5 moderate,
//! < 0.7 strong, otherwise very strong.

use super::basic::mean;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationStrength {
    Negligible,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let r = r.abs();
        if r < 0.1 {
            CorrelationStrength::Negligible
        } else if r < 0.3 {
            CorrelationStrength::Weak
        } else if r < 0.5 {
            CorrelationStrength::Moderate
        } else if r < 0.7 {
            CorrelationStrength::Strong
        } else {
            CorrelationStrength::VeryStrong
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CorrelationStrength::Negligible => "Negligible",
            CorrelationStrength::Weak => "Weak",
            CorrelationStrength::Moderate => "Moderate",
            CorrelationStrength::Strong => "Strong",
            CorrelationStrength::VeryStrong => "Very Strong",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationAnalysis {
    pub coefficient: f64,
    pub p_value: f64,
    pub strength: CorrelationStrength,
    pub is_significant: bool,
    pub sample_size: usize,
    /// `[[1, r], [r, 1]]`
    pub correlation_matrix: [[f64; 2]; 2],
}

impl CorrelationAnalysis {
    /// Reject series of different length; never truncate.
    pub fn compute(x: &[f64], y: &[f64], significance_level: f64) -> Result<Self> {
        if x.len() != y.len() {
            return Err(AnalysisError::invalid(format!(
                "correlation needs equal-length series, got {} and {}",
                x.len(),
                y.len()
            )));
        }

        let n = x.len();
        let r = pearson(x, y);
        let p_value = if n < 3 || r.is_nan() {
            1.0
        } else {
            two_tailed_p(r, n)
        };
        let coefficient = if r.is_nan() { 0.0 } else { r };

        Ok(Self {
            coefficient,
            p_value,
            strength: CorrelationStrength::from_coefficient(coefficient),
            is_significant: p_value < significance_level,
            sample_size: n,
            correlation_matrix: [[1.0, coefficient], [coefficient, 1.0]],
        })
    }

    pub fn direction(&self) -> &'static str {
        if self.coefficient > 0.0 {
            "Positive"
        } else if self.coefficient < 0.0 {
            "Negative"
        } else {
            "None"
        }
    }
}

/// NaN when either series has no spread
pub(crate) fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 {
        return f64::NAN;
    }
    let (mx, my) = (mean(x), mean(y));
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

fn two_tailed_p(r: f64, n: usize) -> f64 {
    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= 1e-15 {
        return 0.0;
    }
    let t = r * (df / denom).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}
