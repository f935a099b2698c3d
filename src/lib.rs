//! archmetrics - structural metrics and statistics for class-level code graphs
//!
//! Takes an entity graph (classes, methods, fields and typed references)
//! produced by a parser and computes coupling, complexity, cohesion,
//! maintainability, circular dependencies, duplication clusters, a
//! technical-debt score, a letter health grade and the risks behind it.
//! Declaration counts and a structural pattern search (singletons,
//! accessors, tests) work on the same graph. A standalone statistics
//! toolkit works on any numeric series derived from those metrics.
//!
//! ```no_run
//! use archmetrics::{AnalysisConfig, EntityGraph, ProjectAnalyzer};
//!
//! # fn main() -> archmetrics::Result<()> {
//! let entities = EntityGraph::from_json("{\"classes\": []}")
//!     .map_err(|e| archmetrics::AnalysisError::invalid(e.to_string()))?;
//! let analyzer = ProjectAnalyzer::new(AnalysisConfig::default())?;
//! let report = analyzer.analyze(&entities);
//! println!("{} ({:.1})", report.health_grade(), report.health_score());
//! # Ok(())
//! # }
//! ```
//!
//! The library never installs a `tracing` subscriber; hook one up in the
//! host application to see progress logs.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod model;
pub mod modules;
pub mod patterns;
pub mod pipeline;
pub mod scoring;
pub mod stats;

pub use analyzer::Analyzer;
pub use config::{load_config, AnalysisConfig};
pub use error::{AnalysisError, Result};
pub use model::{ClassMetrics, CycleGroup, DuplicationCluster, EntityGraph, HealthGrade, ProjectMetrics};
pub use patterns::{CodePattern, PatternSearch, PatternSearchResult};
pub use pipeline::{AnalysisContext, AnalysisReport, ProjectAnalyzer};
pub use scoring::{HealthAssessment, ProjectRisk, RiskLevel};
pub use stats::StatisticsEngine;
