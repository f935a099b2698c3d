//! Per-class and per-method metrics
//!
//! Every calculator here is pure: it reads the entity graph (or the
//! dependency graph built from it) and returns fresh records.

mod complexity;
mod coupling;
mod duplication;
mod inventory;
mod maintainability;
pub mod tokens;
mod usage;

pub use complexity::{cohesion, method_complexity, ClassComplexity, ComplexityEstimator};
pub use coupling::{ClassCoupling, CouplingCalculator};
pub use duplication::{DuplicationDetector, DuplicationInput};
pub use inventory::{InventoryCollector, ProjectStatistics, DEFAULT_PACKAGE};
pub use maintainability::MaintainabilityScorer;
pub use usage::{MethodUsage, UsageAnalyzer, UsageLevel, UsageReport, HOTSPOT_CALLERS, HOTSPOT_CALLS};
