//! Analysis configuration
//!
//! Every formula constant the engine uses is exposed here so that callers can
//! tune it without touching code. Configuration can be built in code, parsed
//! from a TOML string, or loaded from `archmetrics.toml` /
//! `.archmetricsrc.json` in a directory.
//!
//! # Configuration Format
//!
//! ```toml
//! # archmetrics.toml
//! parallel = true
//! workers = 8
//!
//! [complexity]
//! aggregation = "sum"       # or "average"
//! target = 10.0
//!
//! [maintainability]
//! base = 171.0
//! volume_weight = 5.2
//! complexity_weight = 0.23
//! loc_weight = 16.2
//!
//! [duplication]
//! similarity_threshold = 0.85
//! shingle_size = 5
//! min_tokens = 8
//!
//! [debt]
//! duplication = 0.40
//! complexity = 0.35
//! unused = 0.25
//!
//! [stats]
//! significance_level = 0.05
//! confidence_level = 0.95
//! ```

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// File names probed by [`load_config`], in priority order.
pub const CONFIG_FILE_TOML: &str = "archmetrics.toml";
pub const CONFIG_FILE_JSON: &str = ".archmetricsrc.json";

/// Top-level configuration for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Run per-class work on a worker pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Worker pool size (None = one per core, at most 16)
    #[serde(default)]
    pub workers: Option<usize>,

    #[serde(default)]
    pub complexity: ComplexityConfig,

    #[serde(default)]
    pub maintainability: MaintainabilityWeights,

    #[serde(default)]
    pub duplication: DuplicationConfig,

    #[serde(default)]
    pub debt: DebtWeights,

    #[serde(default)]
    pub stats: StatsConfig,
}

fn default_parallel() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            workers: None,
            complexity: ComplexityConfig::default(),
            maintainability: MaintainabilityWeights::default(),
            duplication: DuplicationConfig::default(),
            debt: DebtWeights::default(),
            stats: StatsConfig::default(),
        }
    }
}

/// How method complexities roll up into a class complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityAggregation {
    #[default]
    Sum,
    Average,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityConfig {
    #[serde(default)]
    pub aggregation: ComplexityAggregation,

    /// Average class complexity above which the debt score starts growing
    #[serde(default = "default_complexity_target")]
    pub target: f64,
}

fn default_complexity_target() -> f64 {
    10.0
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            aggregation: ComplexityAggregation::default(),
            target: default_complexity_target(),
        }
    }
}

/// Constants of the maintainability index formula
///
/// `MI = base - volume_weight*ln(V) - complexity_weight*CC - loc_weight*ln(LOC)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintainabilityWeights {
    pub base: f64,
    pub volume_weight: f64,
    pub complexity_weight: f64,
    pub loc_weight: f64,
    /// Volume charged per method/field when no body text is available
    pub fallback_volume_per_member: f64,
}

impl Default for MaintainabilityWeights {
    fn default() -> Self {
        Self {
            base: 171.0,
            volume_weight: 5.2,
            complexity_weight: 0.23,
            loc_weight: 16.2,
            fallback_volume_per_member: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicationConfig {
    /// Jaccard similarity at or above which two bodies are near-duplicates
    pub similarity_threshold: f64,
    /// Tokens per shingle for near-duplicate comparison
    pub shingle_size: usize,
    /// Bodies shorter than this (in canonical tokens) are ignored
    pub min_tokens: usize,
    /// Replace identifiers and literals with placeholders before comparing
    pub normalize_identifiers: bool,
    /// Run the pairwise near-duplicate pass
    pub detect_similar: bool,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            shingle_size: 5,
            min_tokens: 8,
            normalize_identifiers: false,
            detect_similar: true,
        }
    }
}

/// Weights of the technical debt composite (normalized by their sum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebtWeights {
    pub duplication: f64,
    pub complexity: f64,
    pub unused: f64,
}

impl Default for DebtWeights {
    fn default() -> Self {
        Self {
            duplication: 0.40,
            complexity: 0.35,
            unused: 0.25,
        }
    }
}

impl DebtWeights {
    pub fn total(&self) -> f64 {
        self.duplication + self.complexity + self.unused
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// p-value below which a correlation or test is significant
    pub significance_level: f64,
    /// Confidence level for mean intervals
    pub confidence_level: f64,
    /// Tukey fence multiplier
    pub outlier_multiplier: f64,
    /// Principal components kept in projections
    pub pca_components: usize,
    /// Missing-cell ratio that raises a data-quality anomaly
    pub missing_anomaly_ratio: f64,
    /// Duplicate-row ratio that raises a data-quality anomaly
    pub duplicate_anomaly_ratio: f64,
    /// Window for time-series moving averages
    pub moving_average_window: usize,
    /// Smoothing factor for exponential smoothing
    pub smoothing_alpha: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            confidence_level: 0.95,
            outlier_multiplier: 1.5,
            pca_components: 2,
            missing_anomaly_ratio: 0.10,
            duplicate_anomaly_ratio: 0.10,
            moving_average_window: 3,
            smoothing_alpha: 0.3,
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AnalysisError::invalid(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AnalysisError::invalid(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

impl DuplicationConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit("duplication.similarity_threshold", self.similarity_threshold)?;
        if self.shingle_size == 0 {
            return Err(AnalysisError::invalid(
                "duplication.shingle_size must be at least 1",
            ));
        }
        Ok(())
    }
}

impl DebtWeights {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("debt.duplication", self.duplication)?;
        check_non_negative("debt.complexity", self.complexity)?;
        check_non_negative("debt.unused", self.unused)?;
        if self.total() <= 0.0 {
            return Err(AnalysisError::invalid("debt weights must not all be zero"));
        }
        Ok(())
    }
}

impl StatsConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(AnalysisError::invalid(format!(
                "stats.significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(AnalysisError::invalid(format!(
                "stats.confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        check_non_negative("stats.outlier_multiplier", self.outlier_multiplier)?;
        check_unit("stats.missing_anomaly_ratio", self.missing_anomaly_ratio)?;
        check_unit("stats.duplicate_anomaly_ratio", self.duplicate_anomaly_ratio)?;
        check_unit("stats.smoothing_alpha", self.smoothing_alpha)?;
        if self.moving_average_window == 0 {
            return Err(AnalysisError::invalid(
                "stats.moving_average_window must be at least 1",
            ));
        }
        Ok(())
    }
}

impl AnalysisConfig {
    /// Check every section; the first violation wins.
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(AnalysisError::invalid("workers must be at least 1"));
        }
        if !(self.complexity.target.is_finite() && self.complexity.target > 0.0) {
            return Err(AnalysisError::invalid(format!(
                "complexity.target must be positive, got {}",
                self.complexity.target
            )));
        }
        let mi = &self.maintainability;
        check_non_negative("maintainability.volume_weight", mi.volume_weight)?;
        check_non_negative("maintainability.complexity_weight", mi.complexity_weight)?;
        check_non_negative("maintainability.loc_weight", mi.loc_weight)?;
        check_non_negative(
            "maintainability.fallback_volume_per_member",
            mi.fallback_volume_per_member,
        )?;
        self.duplication.validate()?;
        self.debt.validate()?;
        self.stats.validate()
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(content).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Load configuration from a directory, falling back to defaults.
///
/// Tries `archmetrics.toml` first, then `.archmetricsrc.json`. A file that
/// fails to parse or validate is skipped with a warning.
pub fn load_config(dir: &Path) -> AnalysisConfig {
    let toml_path = dir.join(CONFIG_FILE_TOML);
    if toml_path.exists() {
        match load_toml_config(&toml_path) {
            Ok(config) => {
                debug!("Loaded analysis config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", toml_path.display(), e);
            }
        }
    }

    let json_path = dir.join(CONFIG_FILE_JSON);
    if json_path.exists() {
        match load_json_config(&json_path) {
            Ok(config) => {
                debug!("Loaded analysis config from {}", json_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", json_path.display(), e);
            }
        }
    }

    AnalysisConfig::default()
}

fn load_toml_config(path: &Path) -> anyhow::Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AnalysisConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

fn load_json_config(path: &Path) -> anyhow::Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AnalysisConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.duplication.similarity_threshold, 0.85);
        assert_eq!(config.stats.significance_level, 0.05);
        assert!((config.debt.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            parallel = false

            [complexity]
            aggregation = "average"

            [duplication]
            similarity_threshold = 0.9
            "#,
        )
        .unwrap();

        assert!(!config.parallel);
        assert_eq!(config.complexity.aggregation, ComplexityAggregation::Average);
        assert_eq!(config.complexity.target, 10.0);
        assert_eq!(config.duplication.similarity_threshold, 0.9);
        assert_eq!(config.duplication.shingle_size, 5);
        assert_eq!(config.maintainability.base, 171.0);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut config = AnalysisConfig::default();
        config.duplication.similarity_threshold = -0.1;
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_debt_weights_rejected() {
        let mut config = AnalysisConfig::default();
        config.debt = DebtWeights {
            duplication: 0.0,
            complexity: 0.0,
            unused: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let result = AnalysisConfig::from_toml_str("parallel = \"sometimes\"");
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }

    #[test]
    fn test_load_config_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_TOML),
            "workers = 2\n[debt]\nduplication = 1.0\ncomplexity = 0.0\nunused = 0.0\n",
        )
        .unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.debt.duplication, 1.0);
    }

    #[test]
    fn test_load_config_json_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_JSON),
            r#"{"stats": {"pca_components": 3}}"#,
        )
        .unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.stats.pca_components, 3);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_TOML),
            "[duplication]\nsimilarity_threshold = 4.0\n",
        )
        .unwrap();

        let config = load_config(dir.path());
        assert_eq!(config.duplication.similarity_threshold, 0.85);
    }

    #[test]
    fn test_missing_dir_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path());
        assert!(config.parallel);
        assert_eq!(config.workers, None);
    }
}
