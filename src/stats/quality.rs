//! Data quality scoring for tabular records
//!
//! A cell is missing when it is absent or blank. Duplicates are rows whose
//! key column value was already seen; rows with a missing key are never
//! duplicates and do not enter the frequency table.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rows of optional cells
pub type Table = [Vec<Option<String>>];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQualityMetrics {
    pub total_records: usize,
    pub total_cells: usize,
    pub missing_values: usize,
    pub duplicates: usize,
    /// (cells - missing) / cells, 0 for an empty table
    pub completeness_ratio: f64,
    /// Key column value -> occurrences
    pub value_frequencies: BTreeMap<String, usize>,
    pub anomalies: Vec<String>,
}

impl DataQualityMetrics {
    pub fn compute(
        rows: &Table,
        key_column: usize,
        missing_anomaly_ratio: f64,
        duplicate_anomaly_ratio: f64,
    ) -> Self {
        let total_records = rows.len();
        let total_cells: usize = rows.iter().map(|r| r.len()).sum();
        let missing_values = rows
            .iter()
            .flatten()
            .filter(|cell| is_missing(cell.as_deref()))
            .count();

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut duplicates = 0;
        let mut value_frequencies: BTreeMap<String, usize> = BTreeMap::new();
        for row in rows {
            let key = row.get(key_column).and_then(|c| c.as_deref());
            let Some(key) = key.filter(|k| !is_missing(Some(*k))) else {
                continue;
            };
            *value_frequencies.entry(key.to_string()).or_insert(0) += 1;
            if !seen.insert(key) {
                duplicates += 1;
            }
        }

        let completeness_ratio = if total_cells == 0 {
            0.0
        } else {
            (total_cells - missing_values) as f64 / total_cells as f64
        };

        let mut anomalies = Vec::new();
        if total_cells > 0 && missing_values as f64 > missing_anomaly_ratio * total_cells as f64 {
            anomalies.push(format!(
                "High missing value ratio: {:.1}% of cells are empty",
                missing_values as f64 * 100.0 / total_cells as f64
            ));
        }
        if total_records > 0 && duplicates as f64 > duplicate_anomaly_ratio * total_records as f64 {
            anomalies.push(format!(
                "High duplicate ratio: {:.1}% of records repeat a key",
                duplicates as f64 * 100.0 / total_records as f64
            ));
        }

        Self {
            total_records,
            total_cells,
            missing_values,
            duplicates,
            completeness_ratio,
            value_frequencies,
            anomalies,
        }
    }

    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

fn is_missing(cell: Option<&str>) -> bool {
    cell.map_or(true, |c| c.trim().is_empty())
}
