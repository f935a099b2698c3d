//! Graph-level summary: size, density, package dependencies and layering
//!
//! Layers are computed on the condensation of the class graph (every cycle
//! group collapsed into one node). Layer 0 holds classes that depend on no
//! other project class; each further layer depends only on lower ones.

use super::builder::DependencyGraph;
use crate::analyzer::Analyzer;
use petgraph::algo::{condensation, toposort};
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    /// E / (V * (V - 1)), 0 for fewer than two classes
    pub density: f64,
    /// Package -> other packages it references
    pub package_dependencies: BTreeMap<String, BTreeSet<String>>,
    /// Class names per dependency layer, sorted within a layer
    pub layers: Vec<Vec<String>>,
}

impl GraphSummary {
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer index of a class, if present
    pub fn layer_of(&self, class_name: &str) -> Option<usize> {
        self.layers
            .iter()
            .position(|layer| layer.iter().any(|c| c == class_name))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphSummarizer;

impl GraphSummarizer {
    pub fn summarize(&self, graph: &DependencyGraph) -> GraphSummary {
        let n = graph.node_count();
        let e = graph.edge_count();
        let density = if n < 2 {
            0.0
        } else {
            e as f64 / (n as f64 * (n as f64 - 1.0))
        };

        let mut package_dependencies: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for id in 0..n {
            let entry = package_dependencies
                .entry(graph.package(id).to_string())
                .or_default();
            for succ in graph.successors(id) {
                if graph.package(succ) != graph.package(id) {
                    entry.insert(graph.package(succ).to_string());
                }
            }
        }

        let summary = GraphSummary {
            node_count: n,
            edge_count: e,
            density,
            package_dependencies,
            layers: layers(graph),
        };

        debug!(
            "Graph summary: {} classes, {} edges, {} layers",
            n,
            e,
            summary.layer_count()
        );
        summary
    }
}

impl Analyzer<DependencyGraph, GraphSummary> for GraphSummarizer {
    fn analyze(&self, graph: &DependencyGraph) -> GraphSummary {
        self.summarize(graph)
    }
}

fn layers(graph: &DependencyGraph) -> Vec<Vec<String>> {
    if graph.is_empty() {
        return Vec::new();
    }

    let condensed = condensation(graph.to_petgraph(), true);
    let order = match toposort(&condensed, None) {
        Ok(order) => order,
        Err(cycle) => {
            warn!(
                "Condensed dependency graph still has a cycle at {:?}, skipping layering",
                cycle.node_id()
            );
            return Vec::new();
        }
    };

    // Reverse topological order visits dependencies before dependents
    let mut depth = vec![0usize; condensed.node_count()];
    for &node in order.iter().rev() {
        depth[node.index()] = condensed
            .neighbors_directed(node, Direction::Outgoing)
            .map(|dep| depth[dep.index()] + 1)
            .max()
            .unwrap_or(0);
    }

    let layer_count = depth.iter().copied().max().map_or(0, |d| d + 1);
    let mut layers: Vec<Vec<String>> = vec![Vec::new(); layer_count];
    for node in condensed.node_indices() {
        for &id in &condensed[node] {
            layers[depth[node.index()]].push(graph.name(id).to_string());
        }
    }
    for layer in &mut layers {
        layer.sort();
    }
    layers
}
