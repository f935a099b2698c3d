//! Welch's two-sample t-test

use super::basic::{mean, sample_variance};
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

pub const WELCH_T_TEST: &str = "Welch's t-test";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalTestResult {
    pub test_name: String,
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    pub p_value: f64,
    pub significance_level: f64,
    pub is_significant: bool,
    /// mean(a) - mean(b)
    pub mean_difference: f64,
    pub conclusion: String,
}

impl StatisticalTestResult {
    /// Two-tailed test of equal means without assuming equal variances
    pub fn welch(a: &[f64], b: &[f64], significance_level: f64) -> Result<Self> {
        let needed = 2;
        for sample in [a, b] {
            if sample.len() < needed {
                return Err(AnalysisError::InsufficientData {
                    needed,
                    actual: sample.len(),
                });
            }
        }

        let (na, nb) = (a.len() as f64, b.len() as f64);
        let (ma, mb) = (mean(a), mean(b));
        let (va, vb) = (sample_variance(a, ma) / na, sample_variance(b, mb) / nb);
        let se2 = va + vb;
        if se2 <= 0.0 {
            return Err(AnalysisError::failure(
                "both samples have zero variance, t statistic undefined",
            ));
        }

        let statistic = (ma - mb) / se2.sqrt();
        let df = se2 * se2 / (va * va / (na - 1.0) + vb * vb / (nb - 1.0));
        let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| AnalysisError::failure(e.to_string()))?;
        let p_value = (2.0 * (1.0 - dist.cdf(statistic.abs()))).clamp(0.0, 1.0);
        let is_significant = p_value < significance_level;

        let conclusion = if is_significant {
            format!(
                "Means differ significantly (p = {:.4} < {})",
                p_value, significance_level
            )
        } else {
            format!(
                "No significant difference between means (p = {:.4})",
                p_value
            )
        };

        Ok(Self {
            test_name: WELCH_T_TEST.to_string(),
            statistic,
            degrees_of_freedom: df,
            p_value,
            significance_level,
            is_significant,
            mean_difference: ma - mb,
            conclusion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearly_different_means() {
        let a = [10.1, 9.8, 10.3, 10.0, 9.9, 10.2];
        let b = [12.0, 12.4, 11.8, 12.1, 12.3, 11.9];
        let result = StatisticalTestResult::welch(&a, &b, 0.05).unwrap();
        assert!(result.is_significant);
        assert!(result.statistic < 0.0);
        assert!(result.p_value < 1e-6);
        assert!(result.conclusion.starts_with("Means differ"));
    }

    #[test]
    fn test_same_distribution() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [1.5, 2.5, 3.0, 3.5, 4.5];
        let result = StatisticalTestResult::welch(&a, &b, 0.05).unwrap();
        assert!(!result.is_significant);
        assert!(result.mean_difference.abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_welch_degrees_of_freedom() {
        // equal sizes and variances: df = 2(n - 1)
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [11.0, 12.0, 13.0, 14.0];
        let result = StatisticalTestResult::welch(&a, &b, 0.05).unwrap();
        assert!((result.degrees_of_freedom - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_samples() {
        assert!(matches!(
            StatisticalTestResult::welch(&[1.0], &[1.0, 2.0], 0.05),
            Err(AnalysisError::InsufficientData { needed: 2, actual: 1 })
        ));
        assert!(matches!(
            StatisticalTestResult::welch(&[1.0, 1.0], &[2.0, 2.0], 0.05),
            Err(AnalysisError::ComputationFailure(_))
        ));
    }
}
