//! Circular dependency detection
//!
//! Iterative Tarjan over the index adjacency table. Roots are tried in id
//! order and neighbours in sorted order, so both the groups and their members
//! come out in a stable discovery order.

use super::builder::DependencyGraph;
use crate::analyzer::Analyzer;
use crate::model::CycleGroup;
use tracing::debug;

const UNVISITED: usize = usize::MAX;

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleDetector;

impl CycleDetector {
    pub fn new() -> Self {
        Self
    }

    /// Strongly connected components of size >= 2, ordered by the discovery
    /// index of their root. Members are listed in discovery order.
    pub fn find_cycles(&self, graph: &DependencyGraph) -> Vec<CycleGroup> {
        let groups: Vec<CycleGroup> = strongly_connected(graph)
            .into_iter()
            .filter(|component| component.len() >= 2)
            .map(|component| CycleGroup {
                members: component
                    .into_iter()
                    .map(|id| graph.name(id).to_string())
                    .collect(),
            })
            .collect();

        debug!(
            "Cycle detection: {} groups over {} classes",
            groups.len(),
            graph.node_count()
        );
        groups
    }
}

impl Analyzer<DependencyGraph, Vec<CycleGroup>> for CycleDetector {
    fn analyze(&self, graph: &DependencyGraph) -> Vec<CycleGroup> {
        self.find_cycles(graph)
    }
}

/// All SCCs as id lists, sorted by root discovery index, members in
/// discovery order.
fn strongly_connected(graph: &DependencyGraph) -> Vec<Vec<usize>> {
    let n = graph.node_count();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;

    // (root discovery index, members)
    let mut components: Vec<(usize, Vec<usize>)> = Vec::new();

    // Explicit call stack: (node, position in its successor list)
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }

        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let (node, pos) = *frame;
            frame.1 += 1;

            match graph.successor_at(node, pos) {
                Some(succ) if index[succ] == UNVISITED => {
                    index[succ] = next_index;
                    lowlink[succ] = next_index;
                    next_index += 1;
                    stack.push(succ);
                    on_stack[succ] = true;
                    frames.push((succ, 0));
                }
                Some(succ) => {
                    if on_stack[succ] {
                        lowlink[node] = lowlink[node].min(index[succ]);
                    }
                }
                None => {
                    frames.pop();
                    if let Some(&(parent, _)) = frames.last() {
                        lowlink[parent] = lowlink[parent].min(lowlink[node]);
                    }

                    if lowlink[node] == index[node] {
                        let mut members = Vec::new();
                        while let Some(member) = stack.pop() {
                            on_stack[member] = false;
                            members.push(member);
                            if member == node {
                                break;
                            }
                        }
                        members.sort_by_key(|&m| index[m]);
                        components.push((index[node], members));
                    }
                }
            }
        }
    }

    components.sort_by_key(|(root_index, _)| *root_index);
    components.into_iter().map(|(_, members)| members).collect()
}
