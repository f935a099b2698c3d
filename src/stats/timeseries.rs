//! Time-series statistics over an evenly spaced series

use super::basic::{mean, sample_variance};
use serde::{Deserialize, Serialize};
use std::fmt;

/// |slope| at or below this counts as flat
const FLAT_SLOPE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    #[default]
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendDirection::Increasing => "Increasing",
            TrendDirection::Decreasing => "Decreasing",
            TrendDirection::Stable => "Stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesStatistics {
    pub count: usize,
    /// Least-squares slope against the observation index
    pub trend_slope: f64,
    pub trend: TrendDirection,
    /// Trailing window means, `count - window + 1` of them
    pub moving_average: Vec<f64>,
    pub exponential_smoothing: Vec<f64>,
    /// Sample standard deviation of period-over-period returns
    pub volatility: f64,
    /// Lag-1 autocorrelation
    pub autocorrelation: f64,
}

impl TimeSeriesStatistics {
    pub fn compute(values: &[f64], window: usize, alpha: f64) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let trend_slope = trend_slope(values);
        let trend = if trend_slope > FLAT_SLOPE {
            TrendDirection::Increasing
        } else if trend_slope < -FLAT_SLOPE {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        Self {
            count: values.len(),
            trend_slope,
            trend,
            moving_average: moving_average(values, window),
            exponential_smoothing: exponential_smoothing(values, alpha),
            volatility: volatility(values),
            autocorrelation: lag_one_autocorrelation(values),
        }
    }
}

fn trend_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(values);
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }
    sxy / sxx
}

pub(crate) fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

pub(crate) fn exponential_smoothing(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(values.len());
    let mut level = match values.first() {
        Some(&first) => first,
        None => return smoothed,
    };
    smoothed.push(level);
    for &v in &values[1..] {
        level = alpha * v + (1.0 - alpha) * level;
        smoothed.push(level);
    }
    smoothed
}

/// Returns over a zero base are skipped
fn volatility(values: &[f64]) -> f64 {
    let returns: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    sample_variance(&returns, mean(&returns)).sqrt()
}

fn lag_one_autocorrelation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let denom: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    if denom <= 0.0 {
        return 0.0;
    }
    let num: f64 = values
        .windows(2)
        .map(|w| (w[1] - m) * (w[0] - m))
        .sum();
    num / denom
}
