//! Maintainability index

use super::complexity::ClassComplexity;
use crate::analyzer::Analyzer;
use crate::config::MaintainabilityWeights;

#[derive(Debug, Clone, Default)]
pub struct MaintainabilityScorer {
    weights: MaintainabilityWeights,
}

impl MaintainabilityScorer {
    pub fn new(weights: MaintainabilityWeights) -> Self {
        Self { weights }
    }

    /// `clip(base - a ln(max(V,1)) - b CC - c ln(max(LOC,1)), 0, 100)`
    pub fn index(&self, volume: f64, complexity: f64, lines_of_code: f64) -> f64 {
        let w = &self.weights;
        let raw = w.base
            - w.volume_weight * volume.max(1.0).ln()
            - w.complexity_weight * complexity
            - w.loc_weight * lines_of_code.max(1.0).ln();
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(0.0, 100.0)
    }

    /// Volume of a class; falls back to a per-member charge without bodies
    pub fn volume(&self, class: &ClassComplexity) -> f64 {
        class.volume().unwrap_or_else(|| {
            (class.method_count + class.field_count) as f64
                * self.weights.fallback_volume_per_member
        })
    }

    pub fn score(&self, class: &ClassComplexity) -> f64 {
        self.index(
            self.volume(class),
            class.complexity,
            class.lines_of_code as f64,
        )
    }
}

impl Analyzer<ClassComplexity, f64> for MaintainabilityScorer {
    fn analyze(&self, class: &ClassComplexity) -> f64 {
        self.score(class)
    }
}

impl Analyzer<[ClassComplexity], Vec<f64>> for MaintainabilityScorer {
    fn analyze(&self, classes: &[ClassComplexity]) -> Vec<f64> {
        classes.iter().map(|c| self.score(c)).collect()
    }
}
