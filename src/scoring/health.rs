//! Health score, grade, display summary, recommendations and risks

use crate::model::{ClassMetrics, HealthGrade, ProjectMetrics};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Duplication ratio above which duplication is called out
pub const HIGH_DUPLICATION: f64 = 0.10;
/// Average class complexity above which refactoring is suggested
pub const HIGH_COMPLEXITY: f64 = 15.0;
/// Average maintainability below which maintainability is called out
pub const LOW_MAINTAINABILITY: f64 = 60.0;
/// Share of unused methods above which dead code is called out
pub const HIGH_UNUSED_SHARE: f64 = 0.20;
/// Code reuse below which shared abstractions are suggested
pub const LOW_REUSE: f64 = 0.30;
/// Efferent coupling above which a class is a risk
pub const RISKY_EFFERENT_COUPLING: usize = 20;
/// Duplication ratio above which duplication is a risk
pub const RISKY_DUPLICATION: f64 = 0.20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRisk {
    pub level: RiskLevel,
    pub category: String,
    pub description: String,
    pub mitigation: String,
}

impl ProjectRisk {
    fn new(level: RiskLevel, category: &str, description: String, mitigation: &str) -> Self {
        Self {
            level,
            category: category.to_string(),
            description,
            mitigation: mitigation.to_string(),
        }
    }
}

/// Score, grade, recommendations and risks in one record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAssessment {
    pub health_score: f64,
    pub health_grade: HealthGrade,
    pub recommendations: Vec<String>,
    pub risks: Vec<ProjectRisk>,
}

impl HealthAssessment {
    pub fn highest_risk(&self) -> Option<RiskLevel> {
        self.risks.iter().map(|r| r.level).max()
    }
}

impl ProjectMetrics {
    /// `(100 - debt) * (maintainability / 100) * (1 - duplication)`, in [0, 100]
    pub fn health_score(&self) -> f64 {
        let debt = self.technical_debt_score.clamp(0.0, 100.0);
        let maintainability = self.average_maintainability.clamp(0.0, 100.0);
        let duplication = self.duplication_ratio.clamp(0.0, 1.0);
        (100.0 - debt) * (maintainability / 100.0) * (1.0 - duplication)
    }

    pub fn health_grade(&self) -> HealthGrade {
        HealthGrade::from_score(self.health_score())
    }

    /// String-keyed values for quick display
    pub fn summary(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("Total Classes".to_string(), self.total_classes.to_string());
        map.insert("Total Methods".to_string(), self.total_methods.to_string());
        map.insert("Lines of Code".to_string(), self.total_lines_of_code.to_string());
        map.insert(
            "Average Complexity".to_string(),
            format!("{:.2}", self.average_complexity),
        );
        map.insert(
            "Average Maintainability".to_string(),
            format!("{:.2}", self.average_maintainability),
        );
        map.insert(
            "Duplication Ratio".to_string(),
            format!("{:.1}%", self.duplication_ratio * 100.0),
        );
        map.insert(
            "Code Reuse".to_string(),
            format!("{:.1}%", self.code_reuse * 100.0),
        );
        map.insert("Unused Methods".to_string(), self.unused_methods.to_string());
        map.insert("Unused Classes".to_string(), self.unused_classes.to_string());
        map.insert(
            "Circular Dependencies".to_string(),
            self.circular_dependencies.to_string(),
        );
        map.insert(
            "Technical Debt Score".to_string(),
            format!("{:.1}", self.technical_debt_score),
        );
        map.insert("Health Score".to_string(), format!("{:.1}", self.health_score()));
        map.insert("Health Grade".to_string(), self.health_grade().to_string());
        map
    }

    pub fn recommendations(&self) -> Vec<String> {
        let mut recs = Vec::new();

        if self.duplication_ratio > HIGH_DUPLICATION {
            recs.push(format!(
                "High code duplication ({:.1}%): extract shared logic into reusable methods",
                self.duplication_ratio * 100.0
            ));
        }
        if self.average_complexity > HIGH_COMPLEXITY {
            recs.push(format!(
                "High average complexity ({:.1}): split large classes and methods",
                self.average_complexity
            ));
        }
        if self.total_classes > 0 && self.average_maintainability < LOW_MAINTAINABILITY {
            recs.push(format!(
                "Low maintainability ({:.1}): simplify logic and reduce class size",
                self.average_maintainability
            ));
        }
        if self.total_methods > 0
            && self.unused_methods as f64 > HIGH_UNUSED_SHARE * self.total_methods as f64
        {
            recs.push(format!(
                "{} unused methods: remove dead code",
                self.unused_methods
            ));
        }
        if self.total_classes > 0 && self.code_reuse < LOW_REUSE {
            recs.push(format!(
                "Low code reuse ({:.1}%): introduce shared abstractions",
                self.code_reuse * 100.0
            ));
        }
        if self.circular_dependencies > 0 {
            recs.push(format!(
                "{} circular dependency groups: break cycles with interfaces or by moving shared types",
                self.circular_dependencies
            ));
        }

        recs
    }

    /// Risks from the project roll-up plus per-class coupling, highest first
    pub fn risks(&self, classes: &[ClassMetrics]) -> Vec<ProjectRisk> {
        let mut risks = Vec::new();

        if self.circular_dependencies > 0 {
            risks.push(ProjectRisk::new(
                RiskLevel::High,
                "Circular Dependencies",
                format!("Found {} circular dependencies", self.circular_dependencies),
                "Refactor to break circular dependencies",
            ));
        }

        let coupled: Vec<&ClassMetrics> = classes
            .iter()
            .filter(|c| c.efferent_coupling > RISKY_EFFERENT_COUPLING)
            .collect();
        if let Some(worst) = coupled.iter().max_by_key(|c| c.efferent_coupling) {
            risks.push(ProjectRisk::new(
                RiskLevel::Medium,
                "High Coupling",
                format!(
                    "{} classes depend on more than {} others (worst: {} with {})",
                    coupled.len(),
                    RISKY_EFFERENT_COUPLING,
                    worst.class_name,
                    worst.efferent_coupling
                ),
                "Consider breaking down highly coupled classes",
            ));
        }

        if self.duplication_ratio > RISKY_DUPLICATION {
            risks.push(ProjectRisk::new(
                RiskLevel::Medium,
                "Code Duplication",
                format!("{:.1}% of code is duplicated", self.duplication_ratio * 100.0),
                "Extract duplicated code into reusable components",
            ));
        }

        risks
    }

    pub fn assess(&self, classes: &[ClassMetrics]) -> HealthAssessment {
        HealthAssessment {
            health_score: self.health_score(),
            health_grade: self.health_grade(),
            recommendations: self.recommendations(),
            risks: self.risks(classes),
        }
    }
}
