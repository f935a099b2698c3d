//! IQR outliers with Tukey fences
//!
//! Fences are `Q1 - k*IQR` and `Q3 + k*IQR` (k = 1.5 by default). Values
//! strictly outside the fences are outliers and keep their input position.

use super::basic::{percentile, sorted};
use serde::{Deserialize, Serialize};

pub const IQR_METHOD: &str = "IQR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierAnalysis {
    pub method: String,
    pub sample_size: usize,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub multiplier: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub outliers: Vec<Outlier>,
}

impl OutlierAnalysis {
    pub fn compute(values: &[f64], multiplier: f64) -> Self {
        let sorted = sorted(values);
        let q1 = percentile(&sorted, 0.25);
        let q3 = percentile(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower_bound = q1 - multiplier * iqr;
        let upper_bound = q3 + multiplier * iqr;

        let outliers = values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v < lower_bound || **v > upper_bound)
            .map(|(index, &value)| Outlier { index, value })
            .collect();

        Self {
            method: IQR_METHOD.to_string(),
            sample_size: values.len(),
            q1,
            q3,
            iqr,
            multiplier,
            lower_bound,
            upper_bound,
            outliers,
        }
    }

    pub fn outlier_count(&self) -> usize {
        self.outliers.len()
    }

    pub fn outlier_ratio(&self) -> f64 {
        if self.sample_size == 0 {
            0.0
        } else {
            self.outliers.len() as f64 / self.sample_size as f64
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.outliers.iter().map(|o| o.value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_extreme_value() {
        let analysis = OutlierAnalysis::compute(&[1.0, 2.0, 3.0, 4.0, 100.0], 1.5);
        assert_eq!(analysis.method, "IQR");
        assert!((analysis.q1 - 2.0).abs() < 1e-9);
        assert!((analysis.q3 - 4.0).abs() < 1e-9);
        assert!((analysis.iqr - 2.0).abs() < 1e-9);
        assert!((analysis.lower_bound + 1.0).abs() < 1e-9);
        assert!((analysis.upper_bound - 7.0).abs() < 1e-9);
        assert_eq!(analysis.outliers, vec![Outlier { index: 4, value: 100.0 }]);
        assert!((analysis.outlier_ratio() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_positions_preserved_for_low_and_high() {
        let values = [-50.0, 10.0, 11.0, 12.0, 13.0, 14.0, 90.0];
        let analysis = OutlierAnalysis::compute(&values, 1.5);
        let indices: Vec<usize> = analysis.outliers.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 6]);
        assert_eq!(analysis.values(), vec![-50.0, 90.0]);
    }

    #[test]
    fn test_no_outliers_and_empty() {
        assert_eq!(OutlierAnalysis::compute(&[1.0, 2.0, 3.0], 1.5).outlier_count(), 0);
        let empty = OutlierAnalysis::compute(&[], 1.5);
        assert_eq!(empty.sample_size, 0);
        assert_eq!(empty.outlier_ratio(), 0.0);
    }
}
