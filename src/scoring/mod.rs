//! Project-level scoring
//!
//! # Scoring Formula
//!
//! ```text
//! Debt   = 100 × (w_dup × duplication + w_cx × overshoot + w_unused × unused) / Σw
//! Health = (100 - Debt) × (Maintainability / 100) × (1 - duplication)
//!
//! Where:
//!   overshoot = clamp((avg complexity - target) / target, 0, 1)
//!   unused    = (unused classes + unused methods) / (classes + methods)
//! ```
//!
//! Default weights: duplication 0.40, complexity 0.35, unused 0.25, complexity
//! target 10. All of them come from [`crate::config::DebtWeights`] and
//! [`crate::config::ComplexityConfig`].
//!
//! # Grades
//!
//! A ≥ 90, B ≥ 80, C ≥ 70, D ≥ 60, F below.
//!
//! # Risks
//!
//! Any circular dependency is a high risk. A class with more than 20
//! efferent dependencies, or duplication above 20%, is a medium risk.

mod aggregator;
mod health;

pub use aggregator::{AggregationInput, ProjectAggregator};
pub use health::{
    HealthAssessment, ProjectRisk, RiskLevel, HIGH_COMPLEXITY, HIGH_DUPLICATION,
    HIGH_UNUSED_SHARE, LOW_MAINTAINABILITY, LOW_REUSE, RISKY_DUPLICATION,
    RISKY_EFFERENT_COUPLING,
};
