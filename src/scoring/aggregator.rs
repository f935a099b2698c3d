//! Project roll-up and technical debt

use crate::analyzer::Analyzer;
use crate::config::{AnalysisConfig, DebtWeights};
use crate::model::{ClassMetrics, CycleGroup, DuplicationCluster, ProjectMetrics};
use tracing::{debug, info};

/// Everything the aggregator reduces over; only complete collections
#[derive(Debug, Clone, Copy)]
pub struct AggregationInput<'a> {
    pub classes: &'a [ClassMetrics],
    pub clusters: &'a [DuplicationCluster],
    pub cycles: &'a [CycleGroup],
    /// From the method usage pass, 0 without call data
    pub unused_methods: usize,
}

#[derive(Debug, Clone)]
pub struct ProjectAggregator {
    weights: DebtWeights,
    complexity_target: f64,
}

impl Default for ProjectAggregator {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl ProjectAggregator {
    pub fn new(weights: DebtWeights, complexity_target: f64) -> Self {
        Self {
            weights,
            complexity_target,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.debt.clone(), config.complexity.target)
    }

    /// Weighted composite in [0, 100]
    pub fn debt_score(&self, duplication_ratio: f64, average_complexity: f64, unused_ratio: f64) -> f64 {
        let w = &self.weights;
        let total = w.total();
        if total <= 0.0 {
            return 0.0;
        }

        let overshoot = if self.complexity_target > 0.0 {
            ((average_complexity - self.complexity_target) / self.complexity_target).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let composite = w.duplication * duplication_ratio.clamp(0.0, 1.0)
            + w.complexity * overshoot
            + w.unused * unused_ratio.clamp(0.0, 1.0);
        (100.0 * composite / total).clamp(0.0, 100.0)
    }

    pub fn aggregate(&self, input: &AggregationInput<'_>) -> ProjectMetrics {
        let classes = input.classes;
        let total_classes = classes.len();
        if total_classes == 0 {
            debug!("No classes to aggregate");
            return ProjectMetrics {
                circular_dependencies: input.cycles.len(),
                ..Default::default()
            };
        }

        let total_methods: usize = classes.iter().map(|c| c.method_count).sum();
        let total_lines_of_code: u64 = classes.iter().map(|c| c.lines_of_code as u64).sum();
        let average_complexity =
            classes.iter().map(|c| c.complexity).sum::<f64>() / total_classes as f64;
        let average_maintainability =
            classes.iter().map(|c| c.maintainability_index).sum::<f64>() / total_classes as f64;

        let duplicated_lines: u64 = input
            .clusters
            .iter()
            .map(|c| c.total_duplicated_lines())
            .sum();
        let duplication_ratio = if total_lines_of_code == 0 {
            0.0
        } else {
            (duplicated_lines as f64 / total_lines_of_code as f64).clamp(0.0, 1.0)
        };

        let reused = classes.iter().filter(|c| c.afferent_coupling >= 2).count();
        let code_reuse = reused as f64 / total_classes as f64;

        let unused_classes = classes.iter().filter(|c| c.usage_count == 0).count();
        let unused_methods = input.unused_methods.min(total_methods);
        let unused_ratio =
            (unused_classes + unused_methods) as f64 / (total_classes + total_methods) as f64;

        let technical_debt_score = self.debt_score(duplication_ratio, average_complexity, unused_ratio);

        debug!(
            "Debt inputs: duplication={:.1}%, avg complexity={:.2} (target {:.1}), unused={:.1}%",
            duplication_ratio * 100.0,
            average_complexity,
            self.complexity_target,
            unused_ratio * 100.0
        );

        let metrics = ProjectMetrics {
            total_classes,
            total_methods,
            total_lines_of_code,
            average_complexity,
            average_maintainability,
            duplication_ratio,
            code_reuse,
            unused_methods,
            unused_classes,
            technical_debt_score,
            circular_dependencies: input.cycles.len(),
        };

        info!(
            "Project health: {:.1} ({}) - debt {:.1}, maintainability {:.1}, {} classes",
            metrics.health_score(),
            metrics.health_grade(),
            technical_debt_score,
            average_maintainability,
            total_classes
        );

        metrics
    }
}

impl<'a> Analyzer<AggregationInput<'a>, ProjectMetrics> for ProjectAggregator {
    fn analyze(&self, input: &AggregationInput<'a>) -> ProjectMetrics {
        self.aggregate(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, ca: usize, ce: usize, complexity: f64, methods: usize, loc: u32) -> ClassMetrics {
        ClassMetrics {
            class_name: name.to_string(),
            method_count: methods,
            field_count: 0,
            complexity,
            afferent_coupling: ca,
            efferent_coupling: ce,
            cohesion: 1.0,
            maintainability_index: 80.0,
            lines_of_code: loc,
            usage_count: ca,
        }
    }

    fn input<'a>(classes: &'a [ClassMetrics], clusters: &'a [DuplicationCluster]) -> AggregationInput<'a> {
        AggregationInput {
            classes,
            clusters,
            cycles: &[],
            unused_methods: 0,
        }
    }

    #[test]
    fn test_empty_project() {
        let metrics = ProjectAggregator::default().aggregate(&input(&[], &[]));
        assert_eq!(metrics, ProjectMetrics::default());
    }

    #[test]
    fn test_totals_and_ratios() {
        let classes = vec![
            class("p.A", 2, 1, 4.0, 2, 60),
            class("p.B", 0, 1, 8.0, 3, 40),
            class("p.C", 3, 0, 6.0, 1, 100),
        ];
        let clusters = vec![DuplicationCluster {
            methods: vec!["p.A.x()".into(), "p.C.y()".into()],
            line_count: 20,
            impact: 0.1,
            is_similar: false,
            similarity: 1.0,
        }];

        let metrics = ProjectAggregator::default().aggregate(&input(&classes, &clusters));
        assert_eq!(metrics.total_classes, 3);
        assert_eq!(metrics.total_methods, 6);
        assert_eq!(metrics.total_lines_of_code, 200);
        assert!((metrics.average_complexity - 6.0).abs() < 1e-12);
        assert!((metrics.duplication_ratio - 0.1).abs() < 1e-12);
        assert!((metrics.code_reuse - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.unused_classes, 1);

        // 100 * (0.40 * 0.1 + 0.35 * 0 + 0.25 * 1/9) / 1.0
        let expected = 100.0 * (0.40 * 0.1 + 0.25 / 9.0);
        assert!((metrics.technical_debt_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_debt_score_bounds() {
        let aggregator = ProjectAggregator::default();
        assert_eq!(aggregator.debt_score(0.0, 5.0, 0.0), 0.0);
        assert!((aggregator.debt_score(1.0, 100.0, 1.0) - 100.0).abs() < 1e-9);
        // overshoot is half of target above it
        assert!((aggregator.debt_score(0.0, 15.0, 0.0) - 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_custom_weights() {
        let aggregator = ProjectAggregator::new(
            DebtWeights {
                duplication: 1.0,
                complexity: 0.0,
                unused: 0.0,
            },
            10.0,
        );
        assert!((aggregator.debt_score(0.25, 50.0, 1.0) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_unused_methods_and_cycles_counted() {
        let classes = vec![class("p.A", 1, 1, 2.0, 4, 10), class("p.B", 1, 1, 2.0, 4, 10)];
        let cycles = vec![CycleGroup {
            members: vec!["p.A".into(), "p.B".into()],
        }];
        let metrics = ProjectAggregator::default().analyze(&AggregationInput {
            classes: &classes,
            clusters: &[],
            cycles: &cycles,
            unused_methods: 2,
        });
        assert_eq!(metrics.unused_methods, 2);
        assert_eq!(metrics.circular_dependencies, 1);
        assert!((metrics.technical_debt_score - 100.0 * 0.25 * 0.2).abs() < 1e-9);
    }
}
