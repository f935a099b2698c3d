//! Output records produced by one analysis run
//!
//! All records are plain values: created fresh per run from immutable inputs
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One collapsed, weighted edge of the class dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
    pub reference_count: u32,
}

/// A strongly connected component of two or more classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleGroup {
    /// Members in discovery order
    pub members: Vec<String>,
}

impl CycleGroup {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

/// Complexity band of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplexityLevel {
    Simple,
    Moderate,
    Complex,
    VeryComplex,
}

impl ComplexityLevel {
    pub fn from_complexity(complexity: f64) -> Self {
        if complexity < 10.0 {
            ComplexityLevel::Simple
        } else if complexity < 20.0 {
            ComplexityLevel::Moderate
        } else if complexity < 50.0 {
            ComplexityLevel::Complex
        } else {
            ComplexityLevel::VeryComplex
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityLevel::Simple => write!(f, "Simple"),
            ComplexityLevel::Moderate => write!(f, "Moderate"),
            ComplexityLevel::Complex => write!(f, "Complex"),
            ComplexityLevel::VeryComplex => write!(f, "Very Complex"),
        }
    }
}

/// Maintainability band of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MaintainabilityLevel {
    VeryDifficult,
    Difficult,
    Moderate,
    Maintainable,
    HighlyMaintainable,
}

impl MaintainabilityLevel {
    pub fn from_index(index: f64) -> Self {
        if index >= 80.0 {
            MaintainabilityLevel::HighlyMaintainable
        } else if index >= 60.0 {
            MaintainabilityLevel::Maintainable
        } else if index >= 40.0 {
            MaintainabilityLevel::Moderate
        } else if index >= 20.0 {
            MaintainabilityLevel::Difficult
        } else {
            MaintainabilityLevel::VeryDifficult
        }
    }
}

impl fmt::Display for MaintainabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintainabilityLevel::HighlyMaintainable => write!(f, "Highly Maintainable"),
            MaintainabilityLevel::Maintainable => write!(f, "Maintainable"),
            MaintainabilityLevel::Moderate => write!(f, "Moderately Maintainable"),
            MaintainabilityLevel::Difficult => write!(f, "Difficult to Maintain"),
            MaintainabilityLevel::VeryDifficult => write!(f, "Very Difficult to Maintain"),
        }
    }
}

/// Per-class metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class_name: String,
    pub method_count: usize,
    pub field_count: usize,
    pub complexity: f64,
    /// Distinct classes that depend on this one
    pub afferent_coupling: usize,
    /// Distinct classes this one depends on
    pub efferent_coupling: usize,
    pub cohesion: f64,
    pub maintainability_index: f64,
    pub lines_of_code: u32,
    /// Always equal to `afferent_coupling`
    pub usage_count: usize,
}

impl ClassMetrics {
    /// Ce / (Ca + Ce), 0 for an isolated class
    pub fn instability(&self) -> f64 {
        let total = self.afferent_coupling + self.efferent_coupling;
        if total == 0 {
            0.0
        } else {
            self.efferent_coupling as f64 / total as f64
        }
    }

    pub fn complexity_level(&self) -> ComplexityLevel {
        ComplexityLevel::from_complexity(self.complexity)
    }

    pub fn maintainability_level(&self) -> MaintainabilityLevel {
        MaintainabilityLevel::from_index(self.maintainability_index)
    }

    pub fn is_isolated(&self) -> bool {
        self.afferent_coupling == 0 && self.efferent_coupling == 0
    }
}

/// A set of methods whose bodies are identical or near-identical
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicationCluster {
    /// Method ids, in entity-graph order
    pub methods: Vec<String>,
    pub line_count: u32,
    /// Fraction of project LOC this cluster duplicates
    pub impact: f64,
    /// false = token-identical, true = near-duplicate
    pub is_similar: bool,
    /// Lowest pairwise Jaccard similarity that joined the cluster (1.0 for exact)
    pub similarity: f64,
}

impl DuplicationCluster {
    /// Copies beyond the original
    pub fn duplicate_count(&self) -> usize {
        self.methods.len().saturating_sub(1)
    }

    pub fn total_duplicated_lines(&self) -> u64 {
        self.line_count as u64 * self.duplicate_count() as u64
    }

    pub fn duplication_type(&self) -> &'static str {
        if self.is_similar {
            "Similar Code"
        } else {
            "Exact Duplicate"
        }
    }
}

/// Project-wide roll-up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetrics {
    pub total_classes: usize,
    pub total_methods: usize,
    pub total_lines_of_code: u64,
    pub average_complexity: f64,
    pub average_maintainability: f64,
    pub duplication_ratio: f64,
    pub code_reuse: f64,
    pub unused_methods: usize,
    pub unused_classes: usize,
    pub technical_debt_score: f64,
    /// Number of circular dependency groups
    #[serde(default)]
    pub circular_dependencies: usize,
}

/// Letter grade derived from the health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthGrade {
    A,
    B,
    C,
    D,
    F,
}

impl HealthGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            HealthGrade::A
        } else if score >= 80.0 {
            HealthGrade::B
        } else if score >= 70.0 {
            HealthGrade::C
        } else if score >= 60.0 {
            HealthGrade::D
        } else {
            HealthGrade::F
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthGrade::A => "A",
            HealthGrade::B => "B",
            HealthGrade::C => "C",
            HealthGrade::D => "D",
            HealthGrade::F => "F",
        }
    }
}

impl fmt::Display for HealthGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(ca: usize, ce: usize, complexity: f64, mi: f64) -> ClassMetrics {
        ClassMetrics {
            class_name: "p.A".to_string(),
            method_count: 1,
            field_count: 0,
            complexity,
            afferent_coupling: ca,
            efferent_coupling: ce,
            cohesion: 1.0,
            maintainability_index: mi,
            lines_of_code: 10,
            usage_count: ca,
        }
    }

    #[test]
    fn test_instability() {
        assert_eq!(metrics(0, 0, 1.0, 100.0).instability(), 0.0);
        assert_eq!(metrics(1, 3, 1.0, 100.0).instability(), 0.75);
        assert_eq!(metrics(2, 0, 1.0, 100.0).instability(), 0.0);
        assert!(metrics(0, 0, 1.0, 100.0).is_isolated());
    }

    #[test]
    fn test_complexity_bands() {
        assert_eq!(metrics(0, 0, 9.9, 0.0).complexity_level(), ComplexityLevel::Simple);
        assert_eq!(metrics(0, 0, 10.0, 0.0).complexity_level(), ComplexityLevel::Moderate);
        assert_eq!(metrics(0, 0, 20.0, 0.0).complexity_level(), ComplexityLevel::Complex);
        assert_eq!(metrics(0, 0, 50.0, 0.0).complexity_level(), ComplexityLevel::VeryComplex);
        assert_eq!(ComplexityLevel::VeryComplex.to_string(), "Very Complex");
    }

    #[test]
    fn test_maintainability_bands() {
        assert_eq!(MaintainabilityLevel::from_index(80.0), MaintainabilityLevel::HighlyMaintainable);
        assert_eq!(MaintainabilityLevel::from_index(79.9), MaintainabilityLevel::Maintainable);
        assert_eq!(MaintainabilityLevel::from_index(40.0), MaintainabilityLevel::Moderate);
        assert_eq!(MaintainabilityLevel::from_index(20.0), MaintainabilityLevel::Difficult);
        assert_eq!(MaintainabilityLevel::from_index(19.0), MaintainabilityLevel::VeryDifficult);
    }

    #[test]
    fn test_cluster_counts() {
        let cluster = DuplicationCluster {
            methods: vec!["a".into(), "b".into(), "c".into()],
            line_count: 7,
            impact: 0.1,
            is_similar: false,
            similarity: 1.0,
        };
        assert_eq!(cluster.duplicate_count(), 2);
        assert_eq!(cluster.total_duplicated_lines(), 14);
        assert_eq!(cluster.duplication_type(), "Exact Duplicate");
    }

    #[test]
    fn test_grade_thresholds() {
        assert_eq!(HealthGrade::from_score(100.0), HealthGrade::A);
        assert_eq!(HealthGrade::from_score(90.0), HealthGrade::A);
        assert_eq!(HealthGrade::from_score(89.99), HealthGrade::B);
        assert_eq!(HealthGrade::from_score(70.0), HealthGrade::C);
        assert_eq!(HealthGrade::from_score(60.0), HealthGrade::D);
        assert_eq!(HealthGrade::from_score(0.0), HealthGrade::F);
    }
}
