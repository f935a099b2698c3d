//! Statistics toolkit for numeric series
//!
//! Stateless: every call takes the series it works on and returns a fresh
//! record. [`StatisticsEngine`] bundles the toolkit with a [`StatsConfig`] so
//! thresholds (significance, confidence, fence multiplier, ...) come from
//! configuration rather than call sites.
//!
//! | Record | Failure modes |
//! |--------|---------------|
//! | [`BasicStatistics`] | none, empty input gives the `count == 0` sentinel |
//! | [`OutlierAnalysis`] | none |
//! | [`CorrelationAnalysis`] | `InvalidInput` on length mismatch |
//! | [`RegressionAnalysis`] | `InvalidInput`, `InsufficientData`, `ComputationFailure` |
//! | [`DistributionAnalysis`] | none, "Unknown"/"Degenerate" sentinels |
//! | [`MultivariateStatistics`] | `InvalidInput`, `InsufficientData`, `ComputationFailure` |
//! | [`DataQualityMetrics`] | none |
//! | [`SummaryStatistics`] | none |
//! | [`StatisticalTestResult`] | `InsufficientData`, `ComputationFailure` |
//! | [`TimeSeriesStatistics`] | none |

mod basic;
mod correlation;
mod distribution;
mod hypothesis;
mod multivariate;
mod outliers;
mod quality;
mod regression;
mod summary;
mod timeseries;

pub use basic::BasicStatistics;
pub use correlation::{CorrelationAnalysis, CorrelationStrength};
pub use distribution::{DistributionAnalysis, DistributionType};
pub use hypothesis::{StatisticalTestResult, WELCH_T_TEST};
pub use multivariate::{eigen_decomposition, MultivariateStatistics};
pub use outliers::{Outlier, OutlierAnalysis, IQR_METHOD};
pub use quality::{DataQualityMetrics, Table};
pub use regression::RegressionAnalysis;
pub use summary::SummaryStatistics;
pub use timeseries::{TimeSeriesStatistics, TrendDirection};

use crate::analyzer::Analyzer;
use crate::config::StatsConfig;
use crate::error::Result;

#[derive(Debug, Clone, Default)]
pub struct StatisticsEngine {
    config: StatsConfig,
}

impl StatisticsEngine {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn basic(&self, values: &[f64]) -> BasicStatistics {
        BasicStatistics::compute(values)
    }

    pub fn outliers(&self, values: &[f64]) -> OutlierAnalysis {
        OutlierAnalysis::compute(values, self.config.outlier_multiplier)
    }

    pub fn correlation(&self, x: &[f64], y: &[f64]) -> Result<CorrelationAnalysis> {
        CorrelationAnalysis::compute(x, y, self.config.significance_level)
    }

    pub fn regression(&self, x: &[f64], y: &[f64]) -> Result<RegressionAnalysis> {
        RegressionAnalysis::simple(x, y)
    }

    pub fn multiple_regression(&self, predictors: &[Vec<f64>], y: &[f64]) -> Result<RegressionAnalysis> {
        RegressionAnalysis::multiple(predictors, y)
    }

    pub fn distribution(&self, values: &[f64]) -> DistributionAnalysis {
        DistributionAnalysis::compute(
            values,
            self.config.significance_level,
            self.config.confidence_level,
        )
    }

    pub fn multivariate(&self, rows: &[Vec<f64>]) -> Result<MultivariateStatistics> {
        MultivariateStatistics::compute(rows, self.config.pca_components)
    }

    pub fn data_quality(&self, rows: &Table, key_column: usize) -> DataQualityMetrics {
        DataQualityMetrics::compute(
            rows,
            key_column,
            self.config.missing_anomaly_ratio,
            self.config.duplicate_anomaly_ratio,
        )
    }

    pub fn summary(&self, values: &[f64]) -> SummaryStatistics {
        SummaryStatistics::compute(values)
    }

    pub fn welch_t_test(&self, a: &[f64], b: &[f64]) -> Result<StatisticalTestResult> {
        StatisticalTestResult::welch(a, b, self.config.significance_level)
    }

    pub fn time_series(&self, values: &[f64]) -> TimeSeriesStatistics {
        TimeSeriesStatistics::compute(
            values,
            self.config.moving_average_window,
            self.config.smoothing_alpha,
        )
    }
}

impl Analyzer<[f64], BasicStatistics> for StatisticsEngine {
    fn analyze(&self, values: &[f64]) -> BasicStatistics {
        self.basic(values)
    }
}

impl Analyzer<[f64], OutlierAnalysis> for StatisticsEngine {
    fn analyze(&self, values: &[f64]) -> OutlierAnalysis {
        self.outliers(values)
    }
}

impl Analyzer<[f64], DistributionAnalysis> for StatisticsEngine {
    fn analyze(&self, values: &[f64]) -> DistributionAnalysis {
        self.distribution(values)
    }
}

impl Analyzer<[f64], SummaryStatistics> for StatisticsEngine {
    fn analyze(&self, values: &[f64]) -> SummaryStatistics {
        self.summary(values)
    }
}

impl Analyzer<[f64], TimeSeriesStatistics> for StatisticsEngine {
    fn analyze(&self, values: &[f64]) -> TimeSeriesStatistics {
        self.time_series(values)
    }
}

impl Analyzer<[Vec<f64>], Result<MultivariateStatistics>> for StatisticsEngine {
    fn analyze(&self, rows: &[Vec<f64>]) -> Result<MultivariateStatistics> {
        self.multivariate(rows)
    }
}
