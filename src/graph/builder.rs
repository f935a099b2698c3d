//! Class dependency graph construction
//!
//! Turns the entity graph into an index-based adjacency table. Node ids are
//! assigned in qualified-name order and neighbour lists are kept sorted, so
//! every traversal over the graph is deterministic regardless of the order
//! the collaborator listed classes in.
//!
//! # Edge collection
//!
//! For each class, every type mentioned by a field, a method parameter or
//! return type, the superclass, an interface or an explicit reference is
//! split into identifiers (`Map<K, List<V>>` contributes `Map`, `K`, `List`
//! and `V`) and resolved against the project's classes:
//!
//! 1. exact qualified name
//! 2. unique simple name
//! 3. simple name declared in the referencing class's own package
//!
//! Unresolved names (primitives, JDK and third-party types) are dropped, as
//! is anything the caller's [`ProjectMembership`] rejects. Self references
//! never become edges. Repeated references between the same ordered pair
//! collapse into one edge whose weight counts them.

use crate::model::{type_identifiers, DependencyEdge, EntityGraph};
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

/// Decides whether a resolved class belongs to the analyzed project
pub trait ProjectMembership: Sync {
    fn is_member(&self, qualified_name: &str) -> bool;
}

impl<F> ProjectMembership for F
where
    F: Fn(&str) -> bool + Sync,
{
    fn is_member(&self, qualified_name: &str) -> bool {
        self(qualified_name)
    }
}

/// Accepts every class present in the entity graph
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyProjectClass;

impl ProjectMembership for AnyProjectClass {
    fn is_member(&self, _qualified_name: &str) -> bool {
        true
    }
}

/// Directed, weighted class reference graph
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    names: Vec<String>,
    packages: Vec<String>,
    index: FxHashMap<String, usize>,
    /// (target id, reference count), sorted by target id
    forward: Vec<Vec<(usize, u32)>>,
    /// (source id, reference count), sorted by source id
    reverse: Vec<Vec<(usize, u32)>>,
}

impl DependencyGraph {
    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.iter().map(|n| n.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn package(&self, id: usize) -> &str {
        &self.packages[id]
    }

    pub fn id_of(&self, qualified_name: &str) -> Option<usize> {
        self.index.get(qualified_name).copied()
    }

    /// Classes `id` references, in id order
    pub fn successors(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.forward[id].iter().map(|&(t, _)| t)
    }

    /// The `pos`-th successor of `id`
    pub fn successor_at(&self, id: usize, pos: usize) -> Option<usize> {
        self.forward[id].get(pos).map(|&(t, _)| t)
    }

    /// Classes referencing `id`, in id order
    pub fn predecessors(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.reverse[id].iter().map(|&(s, _)| s)
    }

    pub fn out_degree(&self, id: usize) -> usize {
        self.forward[id].len()
    }

    pub fn in_degree(&self, id: usize) -> usize {
        self.reverse[id].len()
    }

    /// Collapsed reference count of `source -> target`, 0 when absent
    pub fn weight(&self, source: usize, target: usize) -> u32 {
        self.forward[source]
            .binary_search_by_key(&target, |&(t, _)| t)
            .map(|pos| self.forward[source][pos].1)
            .unwrap_or(0)
    }

    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.forward
            .iter()
            .enumerate()
            .flat_map(|(src, targets)| {
                targets.iter().map(move |&(dst, count)| DependencyEdge {
                    source: self.names[src].clone(),
                    target: self.names[dst].clone(),
                    reference_count: count,
                })
            })
            .collect()
    }

    /// Name-keyed adjacency map
    pub fn adjacency_map(&self) -> BTreeMap<String, Vec<String>> {
        self.names_map(&self.forward)
    }

    /// Name-keyed reverse adjacency map
    pub fn reverse_adjacency_map(&self) -> BTreeMap<String, Vec<String>> {
        self.names_map(&self.reverse)
    }

    fn names_map(&self, lists: &[Vec<(usize, u32)>]) -> BTreeMap<String, Vec<String>> {
        lists
            .iter()
            .enumerate()
            .map(|(id, list)| {
                (
                    self.names[id].clone(),
                    list.iter().map(|&(n, _)| self.names[n].clone()).collect(),
                )
            })
            .collect()
    }

    /// petgraph view with node weight = node id, edge weight = reference count
    pub fn to_petgraph(&self) -> DiGraph<usize, u32> {
        let mut graph = DiGraph::with_capacity(self.node_count(), self.edge_count());
        let nodes: Vec<NodeIndex> = (0..self.node_count()).map(|id| graph.add_node(id)).collect();
        for (src, targets) in self.forward.iter().enumerate() {
            for &(dst, count) in targets {
                graph.add_edge(nodes[src], nodes[dst], count);
            }
        }
        graph
    }
}

/// Builds a [`DependencyGraph`] from an [`EntityGraph`]
pub struct DependencyGraphBuilder<'a> {
    membership: &'a dyn ProjectMembership,
}

impl Default for DependencyGraphBuilder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyGraphBuilder<'static> {
    pub fn new() -> Self {
        Self {
            membership: &AnyProjectClass,
        }
    }
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn with_membership(membership: &'a dyn ProjectMembership) -> Self {
        Self { membership }
    }

    pub fn build(&self, entities: &EntityGraph) -> DependencyGraph {
        if entities.is_empty() {
            return DependencyGraph::default();
        }

        // Unique qualified names, sorted, become node ids
        let mut qualified: Vec<(String, String)> = entities
            .classes
            .iter()
            .map(|c| (c.qualified_name(), c.package.clone()))
            .collect();
        qualified.sort();
        qualified.dedup_by(|a, b| a.0 == b.0);

        let mut names = Vec::with_capacity(qualified.len());
        let mut packages = Vec::with_capacity(qualified.len());
        for (name, package) in qualified {
            names.push(name);
            packages.push(package);
        }

        let index: FxHashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(id, name)| (name.clone(), id))
            .collect();

        let mut by_simple: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        for (id, name) in names.iter().enumerate() {
            by_simple.entry(simple_name(name)).or_default().push(id);
        }

        let resolver = Resolver {
            index: &index,
            by_simple: &by_simple,
            packages: &packages,
        };

        let mut weights: Vec<BTreeMap<usize, u32>> = vec![BTreeMap::new(); names.len()];
        let mut dropped = 0usize;

        for class in &entities.classes {
            let source = index[&class.qualified_name()];
            for (_kind, raw) in class.raw_references() {
                for ident in type_identifiers(raw) {
                    match resolver.resolve(ident, &class.package) {
                        Some(target)
                            if target != source && self.membership.is_member(&names[target]) =>
                        {
                            *weights[source].entry(target).or_insert(0) += 1;
                        }
                        Some(_) => {}
                        None => dropped += 1,
                    }
                }
            }
        }

        let forward: Vec<Vec<(usize, u32)>> = weights
            .into_iter()
            .map(|targets| targets.into_iter().collect())
            .collect();

        let mut reverse: Vec<Vec<(usize, u32)>> = vec![Vec::new(); names.len()];
        for (src, targets) in forward.iter().enumerate() {
            for &(dst, count) in targets {
                // Sources are visited in id order, so each list stays sorted
                reverse[dst].push((src, count));
            }
        }

        let graph = DependencyGraph {
            names,
            packages,
            index,
            forward,
            reverse,
        };

        debug!(
            "Dependency graph: {} classes, {} edges, {} external references dropped",
            graph.node_count(),
            graph.edge_count(),
            dropped
        );

        graph
    }
}

struct Resolver<'g> {
    index: &'g FxHashMap<String, usize>,
    by_simple: &'g FxHashMap<&'g str, Vec<usize>>,
    packages: &'g [String],
}

impl Resolver<'_> {
    fn resolve(&self, ident: &str, from_package: &str) -> Option<usize> {
        if let Some(&id) = self.index.get(ident) {
            return Some(id);
        }

        let candidates = self.by_simple.get(simple_name(ident))?;
        if ident.contains('.') {
            // Package-qualified but not ours (java.util.List). Nested
            // references like Outer.Inner go through an unambiguous last segment.
            return match candidates.as_slice() {
                [only] if !looks_external(ident) => Some(*only),
                _ => None,
            };
        }

        match candidates.as_slice() {
            [only] => Some(*only),
            many => many
                .iter()
                .copied()
                .find(|&id| self.packages[id] == from_package),
        }
    }
}

fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// A qualified name whose first segment is lowercase names a package
fn looks_external(ident: &str) -> bool {
    ident
        .split('.')
        .next()
        .and_then(|s| s.chars().next())
        .map(|c| c.is_lowercase())
        .unwrap_or(false)
}
