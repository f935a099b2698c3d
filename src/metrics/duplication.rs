//! Duplicate method body detection
//!
//! Two passes over canonical token sequences:
//!
//! 1. **Exact** - bodies with the same xxh3 hash (and equal tokens) form a
//!    cluster with `is_similar = false`.
//! 2. **Near** - the remaining bodies are compared pairwise by Jaccard
//!    similarity of their hashed k-token shingles. Pairs at or above the
//!    threshold are merged with union-find so clustering is transitive.
//!
//! Output order is fixed: exact clusters first, then near clusters, each
//! ordered by the input position of their first participant.

use super::tokens::{canonical, tokenize};
use crate::analyzer::Analyzer;
use crate::config::DuplicationConfig;
use crate::error::Result;
use crate::model::{DuplicationCluster, EntityGraph};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// Input of one detection run: the entity set plus total project LOC
#[derive(Debug, Clone, Copy)]
pub struct DuplicationInput<'a> {
    pub entities: &'a EntityGraph,
    pub total_lines: u64,
}

struct BodyEntry {
    method_id: String,
    lines: u32,
    tokens: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DuplicationDetector {
    config: DuplicationConfig,
    parallel: bool,
}

impl DuplicationDetector {
    pub fn new(config: DuplicationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            parallel: true,
        })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn detect(&self, entities: &EntityGraph, total_lines: u64) -> Vec<DuplicationCluster> {
        let bodies = self.collect_bodies(entities);
        if bodies.len() < 2 {
            return Vec::new();
        }

        let (exact_groups, grouped) = exact_groups(&bodies);
        let near_groups = if self.config.detect_similar {
            self.near_groups(&bodies, &grouped)
        } else {
            Vec::new()
        };

        let mut clusters = Vec::with_capacity(exact_groups.len() + near_groups.len());
        for members in exact_groups {
            clusters.push(make_cluster(&bodies, &members, total_lines, false, 1.0));
        }
        for (members, similarity) in near_groups {
            clusters.push(make_cluster(&bodies, &members, total_lines, true, similarity));
        }

        debug!(
            "Duplication: {} bodies compared, {} clusters ({} exact)",
            bodies.len(),
            clusters.len(),
            clusters.iter().filter(|c| !c.is_similar).count()
        );
        clusters
    }

    fn collect_bodies(&self, entities: &EntityGraph) -> Vec<BodyEntry> {
        let mut bodies = Vec::new();
        for class in &entities.classes {
            let qualified = class.qualified_name();
            for method in &class.methods {
                let Some(body) = method.body.as_deref() else {
                    continue;
                };
                let tokens = canonical(&tokenize(body), self.config.normalize_identifiers);
                if tokens.len() < self.config.min_tokens {
                    continue;
                }
                bodies.push(BodyEntry {
                    method_id: method.id(&qualified),
                    lines: method.loc(),
                    tokens,
                });
            }
        }
        bodies
    }

    /// Union-find over similar pairs among ungrouped bodies. Each component
    /// carries the lowest similarity among the pairs that joined it.
    fn near_groups(&self, bodies: &[BodyEntry], grouped: &[bool]) -> Vec<(Vec<usize>, f64)> {
        let candidates: Vec<usize> = (0..bodies.len()).filter(|&i| !grouped[i]).collect();
        if candidates.len() < 2 {
            return Vec::new();
        }

        let shingles: Vec<Vec<u64>> = candidates
            .iter()
            .map(|&i| shingle_set(&bodies[i].tokens, self.config.shingle_size))
            .collect();

        let threshold = self.config.similarity_threshold;
        let pairs_from = |a: usize| -> Vec<(usize, usize, f64)> {
            ((a + 1)..candidates.len())
                .filter_map(|b| {
                    let (la, lb) = (shingles[a].len(), shingles[b].len());
                    // Jaccard is bounded by the size ratio
                    if (la.min(lb) as f64) < threshold * la.max(lb) as f64 {
                        return None;
                    }
                    let similarity = jaccard(&shingles[a], &shingles[b]);
                    (similarity >= threshold).then_some((a, b, similarity))
                })
                .collect()
        };

        let pairs: Vec<(usize, usize, f64)> = if self.parallel {
            (0..candidates.len()).into_par_iter().flat_map_iter(pairs_from).collect()
        } else {
            (0..candidates.len()).flat_map(pairs_from).collect()
        };

        let mut sets = UnionFind::new(candidates.len());
        for &(a, b, _) in &pairs {
            sets.union(a, b);
        }

        let mut min_similarity: FxHashMap<usize, f64> = FxHashMap::default();
        for &(a, _, similarity) in &pairs {
            let root = sets.find(a);
            let entry = min_similarity.entry(root).or_insert(1.0);
            *entry = entry.min(similarity);
        }

        let mut components: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for local in 0..candidates.len() {
            let root = sets.find(local);
            components.entry(root).or_default().push(local);
        }

        let mut groups: Vec<(Vec<usize>, f64)> = components
            .into_iter()
            .filter(|(_, members)| members.len() >= 2)
            .map(|(root, members)| {
                let similarity = min_similarity.get(&root).copied().unwrap_or(1.0);
                (members.into_iter().map(|l| candidates[l]).collect(), similarity)
            })
            .collect();
        groups.sort_by_key(|(members, _)| members[0]);
        groups
    }
}

impl Default for DuplicationDetector {
    fn default() -> Self {
        Self {
            config: DuplicationConfig::default(),
            parallel: true,
        }
    }
}

impl<'a> Analyzer<DuplicationInput<'a>, Vec<DuplicationCluster>> for DuplicationDetector {
    fn analyze(&self, input: &DuplicationInput<'a>) -> Vec<DuplicationCluster> {
        self.detect(input.entities, input.total_lines)
    }
}

/// Groups of identical token sequences (in input order) and a flag per body
fn exact_groups(bodies: &[BodyEntry]) -> (Vec<Vec<usize>>, Vec<bool>) {
    let mut by_hash: FxHashMap<u64, Vec<usize>> = FxHashMap::default();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (i, body) in bodies.iter().enumerate() {
        let hash = hash_tokens(&body.tokens);
        let slots = by_hash.entry(hash).or_default();
        match slots
            .iter()
            .copied()
            .find(|&g| bodies[groups[g][0]].tokens == body.tokens)
        {
            Some(g) => groups[g].push(i),
            None => {
                slots.push(groups.len());
                groups.push(vec![i]);
            }
        }
    }

    let mut grouped = vec![false; bodies.len()];
    let groups: Vec<Vec<usize>> = groups.into_iter().filter(|g| g.len() >= 2).collect();
    for &i in groups.iter().flatten() {
        grouped[i] = true;
    }
    (groups, grouped)
}

fn hash_tokens(tokens: &[String]) -> u64 {
    xxh3_64(tokens.join("\u{1f}").as_bytes())
}

/// Sorted, deduplicated shingle hashes. A sequence shorter than `k` is one
/// shingle.
fn shingle_set(tokens: &[String], k: usize) -> Vec<u64> {
    let mut set: Vec<u64> = if tokens.len() <= k {
        vec![hash_tokens(tokens)]
    } else {
        tokens.windows(k).map(hash_tokens).collect()
    };
    set.sort_unstable();
    set.dedup();
    set
}

/// Jaccard similarity of two sorted sets
fn jaccard(a: &[u64], b: &[u64]) -> f64 {
    let (mut i, mut j, mut shared) = (0, 0, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

fn make_cluster(
    bodies: &[BodyEntry],
    members: &[usize],
    total_lines: u64,
    is_similar: bool,
    similarity: f64,
) -> DuplicationCluster {
    let line_sum: u64 = members.iter().map(|&i| bodies[i].lines as u64).sum();
    let line_count = (line_sum / members.len() as u64) as u32;
    let duplicate_count = members.len() - 1;
    let impact = if total_lines == 0 {
        0.0
    } else {
        (line_count as f64 * duplicate_count as f64 / total_lines as f64).min(1.0)
    };

    DuplicationCluster {
        methods: members.iter().map(|&i| bodies[i].method_id.clone()).collect(),
        line_count,
        impact,
        is_similar,
        similarity,
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// The smaller root wins so component roots are stable
    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (keep, merge) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[merge] = keep;
        }
    }
}
