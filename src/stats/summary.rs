//! Named summary statistics grouped for display

use super::basic::{excess_kurtosis, percentile, sorted, BasicStatistics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    /// mean, median, mode
    pub central_tendency: BTreeMap<String, f64>,
    /// variance, std_dev, range, iqr, coefficient_of_variation, mean_absolute_deviation
    pub dispersion: BTreeMap<String, f64>,
    /// skewness, kurtosis (excess)
    pub shape: BTreeMap<String, f64>,
    /// p10, p25, p50, p75, p90
    pub percentiles: BTreeMap<String, f64>,
}

impl SummaryStatistics {
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let basic = BasicStatistics::compute(values);
        let sorted = sorted(values);
        let n = values.len() as f64;

        let mut central_tendency = BTreeMap::new();
        central_tendency.insert("mean".to_string(), basic.mean);
        central_tendency.insert("median".to_string(), basic.median);
        central_tendency.insert("mode".to_string(), mode(&sorted));

        let mad = values.iter().map(|v| (v - basic.mean).abs()).sum::<f64>() / n;
        let mut dispersion = BTreeMap::new();
        dispersion.insert("variance".to_string(), basic.variance);
        dispersion.insert("std_dev".to_string(), basic.std_dev);
        dispersion.insert("range".to_string(), basic.range());
        dispersion.insert("iqr".to_string(), basic.iqr());
        dispersion.insert(
            "coefficient_of_variation".to_string(),
            basic.coefficient_of_variation(),
        );
        dispersion.insert("mean_absolute_deviation".to_string(), mad);

        let mut shape = BTreeMap::new();
        shape.insert("skewness".to_string(), basic.skewness);
        shape.insert("kurtosis".to_string(), excess_kurtosis(values, basic.mean));

        let percentiles = [10, 25, 50, 75, 90]
            .iter()
            .map(|&p| (format!("p{}", p), percentile(&sorted, p as f64 / 100.0)))
            .collect();

        Self {
            count: values.len(),
            central_tendency,
            dispersion,
            shape,
            percentiles,
        }
    }

    /// Flat `group.name -> value` view
    pub fn flatten(&self) -> BTreeMap<String, f64> {
        let groups = [
            ("central_tendency", &self.central_tendency),
            ("dispersion", &self.dispersion),
            ("shape", &self.shape),
            ("percentiles", &self.percentiles),
        ];
        groups
            .iter()
            .flat_map(|(group, map)| {
                map.iter()
                    .map(move |(name, value)| (format!("{}.{}", group, name), *value))
            })
            .collect()
    }
}

/// Most frequent value of an ascending slice; the smallest wins ties
fn mode(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_run = 0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_run {
            best_run = j - i;
            best = sorted[i];
        }
        i = j.max(i + 1);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_groups() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let summary = SummaryStatistics::compute(&values);
        assert_eq!(summary.count, 8);
        assert_eq!(summary.central_tendency["mean"], 5.0);
        assert_eq!(summary.central_tendency["mode"], 4.0);
        assert_eq!(summary.dispersion["mean_absolute_deviation"], 1.5);
        assert_eq!(summary.dispersion["range"], 7.0);
        assert_eq!(summary.percentiles.len(), 5);
        assert_eq!(summary.percentiles["p50"], summary.central_tendency["median"]);
        assert!(summary.percentiles["p10"] <= summary.percentiles["p90"]);
    }

    #[test]
    fn test_flatten_and_empty() {
        let summary = SummaryStatistics::compute(&[1.0, 2.0, 3.0, 4.0]);
        let flat = summary.flatten();
        assert!(flat.contains_key("shape.kurtosis"));
        assert_eq!(flat["percentiles.p50"], 2.5);
        assert!(SummaryStatistics::compute(&[]).flatten().is_empty());
    }
}
