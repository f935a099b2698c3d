//! Cyclomatic complexity, size and cohesion
//!
//! Per method: 1 + decision points in the body. Per class: the sum (or mean)
//! of its methods, lines of code, cohesion over shared field access, and the
//! token counts the maintainability volume is derived from.

use super::tokens::{decision_points, tokenize};
use crate::analyzer::Analyzer;
use crate::config::{ComplexityAggregation, ComplexityConfig};
use crate::model::{ClassEntity, EntityGraph, MethodEntity};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

/// Size, complexity and cohesion of one class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassComplexity {
    pub class_name: String,
    pub method_count: usize,
    pub field_count: usize,
    pub complexity: f64,
    pub lines_of_code: u32,
    pub cohesion: f64,
    /// Total body tokens across methods (Halstead N)
    pub token_count: usize,
    /// Distinct body tokens across methods (Halstead eta)
    pub vocabulary: usize,
}

impl ClassComplexity {
    /// `N * log2(max(eta, 2))`, or None when no method carried a body
    pub fn volume(&self) -> Option<f64> {
        if self.token_count == 0 {
            None
        } else {
            let eta = self.vocabulary.max(2) as f64;
            Some(self.token_count as f64 * eta.log2())
        }
    }
}

/// Cyclomatic complexity of a single method; 1 when no body is available
pub fn method_complexity(method: &MethodEntity) -> u32 {
    match method.body.as_deref() {
        Some(body) => 1 + decision_points(&tokenize(body)),
        None => 1,
    }
}

/// Fraction of method pairs sharing at least one accessed field
pub fn cohesion(methods: &[MethodEntity]) -> f64 {
    if methods.len() < 2 {
        return 1.0;
    }

    let field_sets: Vec<FxHashSet<&str>> = methods
        .iter()
        .map(|m| m.accessed_fields.iter().map(String::as_str).collect())
        .collect();

    let mut total = 0usize;
    let mut sharing = 0usize;
    for i in 0..field_sets.len() {
        for j in (i + 1)..field_sets.len() {
            total += 1;
            if !field_sets[i].is_disjoint(&field_sets[j]) {
                sharing += 1;
            }
        }
    }
    sharing as f64 / total as f64
}

#[derive(Debug, Clone)]
pub struct ComplexityEstimator {
    aggregation: ComplexityAggregation,
    parallel: bool,
}

impl Default for ComplexityEstimator {
    fn default() -> Self {
        Self::new(&ComplexityConfig::default())
    }
}

impl ComplexityEstimator {
    pub fn new(config: &ComplexityConfig) -> Self {
        Self {
            aggregation: config.aggregation,
            parallel: true,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn estimate_class(&self, class: &ClassEntity) -> ClassComplexity {
        let mut sum = 0u64;
        let mut lines = class.fields.len() as u32;
        let mut token_count = 0usize;
        let mut vocabulary: FxHashSet<&str> = FxHashSet::default();

        for method in &class.methods {
            lines = lines.saturating_add(method.loc());
            match method.body.as_deref() {
                Some(body) => {
                    let tokens = tokenize(body);
                    sum += 1 + decision_points(&tokens) as u64;
                    token_count += tokens.len();
                    vocabulary.extend(tokens.iter().map(|t| t.text));
                }
                None => sum += 1,
            }
        }

        let complexity = match self.aggregation {
            ComplexityAggregation::Sum => sum as f64,
            ComplexityAggregation::Average if class.methods.is_empty() => 0.0,
            ComplexityAggregation::Average => sum as f64 / class.methods.len() as f64,
        };

        ClassComplexity {
            class_name: class.qualified_name(),
            method_count: class.methods.len(),
            field_count: class.fields.len(),
            complexity,
            lines_of_code: lines,
            cohesion: cohesion(&class.methods),
            token_count,
            vocabulary: vocabulary.len(),
        }
    }

    /// One entry per class, in entity-graph order
    pub fn estimate(&self, entities: &EntityGraph) -> Vec<ClassComplexity> {
        let results: Vec<ClassComplexity> = if self.parallel {
            entities
                .classes
                .par_iter()
                .map(|c| self.estimate_class(c))
                .collect()
        } else {
            entities
                .classes
                .iter()
                .map(|c| self.estimate_class(c))
                .collect()
        };

        debug!(
            "Complexity estimated for {} classes ({} methods)",
            results.len(),
            entities.method_count()
        );
        results
    }
}

impl Analyzer<EntityGraph, Vec<ClassComplexity>> for ComplexityEstimator {
    fn analyze(&self, entities: &EntityGraph) -> Vec<ClassComplexity> {
        self.estimate(entities)
    }
}

impl Analyzer<ClassEntity, ClassComplexity> for ComplexityEstimator {
    fn analyze(&self, class: &ClassEntity) -> ClassComplexity {
        self.estimate_class(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ClassEntity {
        ClassEntity::new("app", "Service")
            .with_field("cache", "Cache")
            .with_field("repo", "Repo")
            .with_method(
                MethodEntity::new("find")
                    .with_body("{\n  if (cache.has(id)) {\n    return cache.get(id);\n  }\n  return repo.load(id);\n}")
                    .accessing(&["cache", "repo"]),
            )
            .with_method(
                MethodEntity::new("evict")
                    .with_body("{\n  for (String k : keys) {\n    if (k != null && k.isEmpty()) cache.remove(k);\n  }\n}")
                    .accessing(&["cache"]),
            )
            .with_method(MethodEntity::new("name").with_lines(3))
    }

    #[test]
    fn test_method_complexity() {
        let class = service();
        assert_eq!(method_complexity(&class.methods[0]), 2);
        assert_eq!(method_complexity(&class.methods[1]), 4);
        assert_eq!(method_complexity(&class.methods[2]), 1);
    }

    #[test]
    fn test_class_sum_and_average() {
        let class = service();
        let sum = ComplexityEstimator::default().estimate_class(&class);
        assert_eq!(sum.complexity, 7.0);
        assert_eq!(sum.method_count, 3);
        assert_eq!(sum.field_count, 2);
        // 6 + 5 body lines, 3 explicit, 2 fields
        assert_eq!(sum.lines_of_code, 16);

        let avg = ComplexityEstimator::new(&ComplexityConfig {
            aggregation: ComplexityAggregation::Average,
            target: 10.0,
        })
        .estimate_class(&class);
        assert!((avg.complexity - 7.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cohesion() {
        // find/evict share cache; name shares nothing
        let class = service();
        assert!((cohesion(&class.methods) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(cohesion(&class.methods[..1]), 1.0);
        assert_eq!(cohesion(&[]), 1.0);
    }

    #[test]
    fn test_volume() {
        let class = ClassEntity::new("p", "Bodyless").with_method(MethodEntity::new("a"));
        assert_eq!(ComplexityEstimator::default().estimate_class(&class).volume(), None);

        let stats = ComplexityEstimator::default().estimate_class(&service());
        let volume = stats.volume().unwrap();
        assert!(volume > 0.0);
        assert!(stats.vocabulary <= stats.token_count);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let entities = EntityGraph::new(vec![service(), ClassEntity::new("p", "Empty")]);
        let parallel = ComplexityEstimator::default().estimate(&entities);
        let sequential = ComplexityEstimator::default()
            .with_parallel(false)
            .analyze(&entities);
        assert_eq!(parallel, sequential);
        assert_eq!(parallel[1].complexity, 0.0);
        assert_eq!(parallel[1].cohesion, 1.0);
    }
}
