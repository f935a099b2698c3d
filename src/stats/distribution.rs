//! Normal fit with a one-sample Kolmogorov-Smirnov test
//!
//! The normal model is fitted with the sample mean and sample variance. The
//! p-value uses the asymptotic Kolmogorov distribution with the Stephens
//! small-sample correction `λ = (√n + 0.12 + 0.11/√n) D`.

use super::basic::{mean, sample_variance, sorted};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use std::fmt;

/// λ at which the KS tail switches from the small-λ to the alternating series
const KS_SERIES_SWITCH: f64 = 1.18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionType {
    Normal,
    NonNormal,
    /// Constant series, no spread to fit
    Degenerate,
    /// Fewer than two values
    Unknown,
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DistributionType::Normal => "Normal",
            DistributionType::NonNormal => "Non-normal",
            DistributionType::Degenerate => "Degenerate",
            DistributionType::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionAnalysis {
    pub distribution_type: DistributionType,
    pub sample_size: usize,
    pub mean: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub ks_statistic: f64,
    pub p_value: f64,
    pub is_normal: bool,
    pub confidence_level: f64,
    /// (lower, upper) bounds of the mean
    pub confidence_interval: (f64, f64),
}

impl DistributionAnalysis {
    pub fn compute(values: &[f64], significance_level: f64, confidence_level: f64) -> Self {
        let n = values.len();
        let m = mean(values);

        if n < 2 {
            return Self {
                distribution_type: DistributionType::Unknown,
                sample_size: n,
                mean: m,
                variance: 0.0,
                std_dev: 0.0,
                ks_statistic: 0.0,
                p_value: 1.0,
                is_normal: false,
                confidence_level,
                confidence_interval: (m, m),
            };
        }

        let variance = sample_variance(values, m);
        let std_dev = variance.sqrt();
        let confidence_interval = mean_interval(m, std_dev, n, confidence_level);

        let fitted = match Normal::new(m, std_dev) {
            Ok(normal) if std_dev > 0.0 => normal,
            _ => {
                return Self {
                    distribution_type: DistributionType::Degenerate,
                    sample_size: n,
                    mean: m,
                    variance,
                    std_dev,
                    ks_statistic: 0.0,
                    p_value: 0.0,
                    is_normal: false,
                    confidence_level,
                    confidence_interval,
                };
            }
        };

        let d = ks_statistic(&sorted(values), |x| fitted.cdf(x));
        let p_value = kolmogorov_p_value(d, n);
        let is_normal = p_value > significance_level;

        Self {
            distribution_type: if is_normal {
                DistributionType::Normal
            } else {
                DistributionType::NonNormal
            },
            sample_size: n,
            mean: m,
            variance,
            std_dev,
            ks_statistic: d,
            p_value,
            is_normal,
            confidence_level,
            confidence_interval,
        }
    }

    pub fn margin_of_error(&self) -> f64 {
        (self.confidence_interval.1 - self.confidence_interval.0) / 2.0
    }
}

/// sup |F_n(x) - F(x)| over an ascending sample
pub(crate) fn ks_statistic(sorted: &[f64], cdf: impl Fn(f64) -> f64) -> f64 {
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            let f = cdf(x);
            let above = (i + 1) as f64 / n - f;
            let below = f - i as f64 / n;
            above.max(below)
        })
        .fold(0.0, f64::max)
}

/// Kolmogorov survival function Q_KS(λ) with the Stephens small-sample
/// correction `λ = (√n + 0.12 + 0.11/√n) d`.
///
/// Below `λ = 1.18` the alternating series `2 Σ (-1)^(k-1) exp(-2k²λ²)`
/// converges too slowly, so the Jacobi-transformed form
/// `1 - √(2π)/λ Σ exp(-(2k-1)²π²/(8λ²))` is used there instead.
pub(crate) fn kolmogorov_p_value(d: f64, n: usize) -> f64 {
    let sqrt_n = (n as f64).sqrt();
    let lambda = (sqrt_n + 0.12 + 0.11 / sqrt_n) * d;
    if lambda <= 0.0 {
        return 1.0;
    }

    if lambda < KS_SERIES_SWITCH {
        let scale = -std::f64::consts::PI.powi(2) / (8.0 * lambda * lambda);
        let mut sum = 0.0;
        for k in 1..=50 {
            let odd = (2 * k - 1) as f64;
            let term = (odd * odd * scale).exp();
            sum += term;
            if term < 1e-16 {
                break;
            }
        }
        let p = 1.0 - (2.0 * std::f64::consts::PI).sqrt() / lambda * sum;
        return p.clamp(0.0, 1.0);
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let k = k as f64;
        let term = sign * (-2.0 * k * k * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-16 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Student t interval for the mean
pub(crate) fn mean_interval(mean: f64, std_dev: f64, n: usize, confidence_level: f64) -> (f64, f64) {
    if n < 2 || std_dev == 0.0 {
        return (mean, mean);
    }
    let critical = StudentsT::new(0.0, 1.0, (n - 1) as f64)
        .map(|t| t.inverse_cdf(0.5 + confidence_level / 2.0))
        .unwrap_or(1.96);
    let margin = critical * std_dev / (n as f64).sqrt();
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Normal quantiles at evenly spaced probabilities
    fn normal_sample(n: usize) -> Vec<f64> {
        let dist = Normal::new(50.0, 10.0).unwrap();
        (1..=n)
            .map(|i| dist.inverse_cdf(i as f64 / (n as f64 + 1.0)))
            .collect()
    }

    #[test]
    fn test_normal_sample_is_normal() {
        let analysis = DistributionAnalysis::compute(&normal_sample(60), 0.05, 0.95);
        assert!(analysis.is_normal);
        assert_eq!(analysis.distribution_type, DistributionType::Normal);
        assert!(analysis.ks_statistic < 0.1);
        let (lo, hi) = analysis.confidence_interval;
        assert!(lo < 50.0 && 50.0 < hi);
    }

    #[test]
    fn test_bimodal_sample_is_not_normal() {
        let mut values = vec![0.0; 40];
        values.extend(vec![100.0; 40]);
        values[0] = 0.5;
        values[79] = 99.5;
        let analysis = DistributionAnalysis::compute(&values, 0.05, 0.95);
        assert!(!analysis.is_normal);
        assert_eq!(analysis.distribution_type.to_string(), "Non-normal");
    }

    #[test]
    fn test_degenerate_and_unknown() {
        let constant = DistributionAnalysis::compute(&[3.0, 3.0, 3.0], 0.05, 0.95);
        assert_eq!(constant.distribution_type, DistributionType::Degenerate);
        assert!(!constant.is_normal);
        assert_eq!(constant.confidence_interval, (3.0, 3.0));

        let single = DistributionAnalysis::compute(&[1.0], 0.05, 0.95);
        assert_eq!(single.distribution_type, DistributionType::Unknown);
        let empty = DistributionAnalysis::compute(&[], 0.05, 0.95);
        assert_eq!(empty.sample_size, 0);
    }

    #[test]
    fn test_confidence_interval_width() {
        // n = 4, sd = 1: t(0.975, 3) ≈ 3.182
        let analysis = DistributionAnalysis::compute(&[-1.0, 1.0, -1.0, 1.0], 0.05, 0.95);
        let sd = analysis.std_dev;
        assert!((analysis.margin_of_error() - 3.182446 * sd / 2.0).abs() < 1e-3);
        let wider = DistributionAnalysis::compute(&[-1.0, 1.0, -1.0, 1.0], 0.05, 0.99);
        assert!(wider.margin_of_error() > analysis.margin_of_error());
    }

    #[test]
    fn test_kolmogorov_tail() {
        assert_eq!(kolmogorov_p_value(0.0, 10), 1.0);
        assert!(kolmogorov_p_value(0.5, 100) < 1e-10);
        let p = kolmogorov_p_value(0.1, 100);
        assert!(p > 0.2 && p < 0.35);
    }

    #[test]
    fn test_kolmogorov_small_lambda() {
        let n = 250_000;
        let sqrt_n = (n as f64).sqrt();
        let p = kolmogorov_p_value(0.0013 / (sqrt_n + 0.12 + 0.11 / sqrt_n), n);
        assert_eq!(p, 1.0);
        let p = kolmogorov_p_value(0.015 / sqrt_n, n);
        assert!(p > 0.99);
    }

    #[test]
    fn test_kolmogorov_tail_is_monotone_across_switch() {
        let mut previous = 1.0;
        for step in 1..=300 {
            let lambda = step as f64 * 0.01;
            // n = 1 makes the corrected λ equal to 1.23 d
            let p = kolmogorov_p_value(lambda / 1.23, 1);
            assert!(p <= previous + 1e-12, "p rose at λ = {}", lambda);
            previous = p;
        }
        // both series agree near the switch point
        let below = kolmogorov_p_value((KS_SERIES_SWITCH - 1e-9) / 1.23, 1);
        let above = kolmogorov_p_value((KS_SERIES_SWITCH + 1e-9) / 1.23, 1);
        assert!((below - above).abs() < 1e-8);
    }

    #[test]
    fn test_large_normal_sample_is_normal() {
        let n = 250_000;
        let dist = Normal::new(0.0, 1.0).unwrap();
        let values: Vec<f64> = (1..=n)
            .map(|i| dist.inverse_cdf((i as f64 - 0.5) / n as f64))
            .collect();
        let analysis = DistributionAnalysis::compute(&values, 0.05, 0.95);
        assert!(analysis.ks_statistic < 1e-3);
        assert!(analysis.p_value > 0.05);
        assert!(analysis.is_normal);
        assert_eq!(analysis.distribution_type, DistributionType::Normal);
    }
}
