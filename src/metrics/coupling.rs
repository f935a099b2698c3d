//! Afferent/efferent coupling per class

use crate::analyzer::Analyzer;
use crate::graph::DependencyGraph;
use serde::Serialize;

/// Coupling of one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCoupling {
    pub class_name: String,
    /// Distinct classes with an edge into this one
    pub afferent: usize,
    /// Distinct classes this one has an edge to
    pub efferent: usize,
}

impl ClassCoupling {
    pub fn usage_count(&self) -> usize {
        self.afferent
    }

    pub fn instability(&self) -> f64 {
        let total = self.afferent + self.efferent;
        if total == 0 {
            0.0
        } else {
            self.efferent as f64 / total as f64
        }
    }

    pub fn is_isolated(&self) -> bool {
        self.afferent == 0 && self.efferent == 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CouplingCalculator;

impl CouplingCalculator {
    /// One entry per graph node, in node id order
    pub fn calculate(&self, graph: &DependencyGraph) -> Vec<ClassCoupling> {
        (0..graph.node_count())
            .map(|id| ClassCoupling {
                class_name: graph.name(id).to_string(),
                afferent: graph.in_degree(id),
                efferent: graph.out_degree(id),
            })
            .collect()
    }
}

impl Analyzer<DependencyGraph, Vec<ClassCoupling>> for CouplingCalculator {
    fn analyze(&self, graph: &DependencyGraph) -> Vec<ClassCoupling> {
        self.calculate(graph)
    }
}
