//! Full analysis run over one entity graph
//!
//! ```text
//! EntityGraph ──► DependencyGraph ─┬─► cycles      ┐
//!                                  ├─► coupling    ├─ rayon::join
//!             └──────────────────────► complexity  ┘
//!                                          │
//!                                          ▼
//!                 maintainability ─► ClassMetrics ─► duplication ─► usage
//!                                                                     │
//!                                                                     ▼
//!                                                          ProjectMetrics
//! ```
//!
//! Declaration counts ([`ProjectStatistics`]) are collected alongside, and
//! the report derives risks and a [`HealthAssessment`] on demand.
//!
//! The pipeline owns a dedicated rayon pool sized from the configuration.
//! When the pool cannot be built the run degrades to sequential execution.

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::graph::{
    AnyProjectClass, CycleDetector, DependencyGraph, DependencyGraphBuilder, GraphSummarizer,
    GraphSummary, ProjectMembership,
};
use crate::metrics::{
    ClassComplexity, ClassCoupling, ComplexityEstimator, CouplingCalculator, DuplicationDetector,
    InventoryCollector, MaintainabilityScorer, ProjectStatistics, UsageAnalyzer, UsageReport,
};
use crate::model::{
    ClassMetrics, CycleGroup, DependencyEdge, DuplicationCluster, EntityGraph, HealthGrade,
    ProjectMetrics,
};
use crate::scoring::{AggregationInput, HealthAssessment, ProjectAggregator, ProjectRisk};
use rayon::ThreadPool;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

/// Upper bound on auto-detected worker threads
const MAX_AUTO_WORKERS: usize = 16;

/// Everything one run produces
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub graph_summary: GraphSummary,
    pub edges: Vec<DependencyEdge>,
    pub cycles: Vec<CycleGroup>,
    /// Entity-graph order
    pub classes: Vec<ClassMetrics>,
    pub clusters: Vec<DuplicationCluster>,
    pub usage: UsageReport,
    pub project: ProjectMetrics,
    pub statistics: ProjectStatistics,
}

impl AnalysisReport {
    pub fn health_score(&self) -> f64 {
        self.project.health_score()
    }

    pub fn health_grade(&self) -> HealthGrade {
        self.project.health_grade()
    }

    pub fn risks(&self) -> Vec<ProjectRisk> {
        self.project.risks(&self.classes)
    }

    pub fn assess_health(&self) -> HealthAssessment {
        self.project.assess(&self.classes)
    }

    pub fn class(&self, qualified_name: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.class_name == qualified_name)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnalysisError::failure(e.to_string()))
    }
}

/// Caller-owned cache of the last report
///
/// Keyed on a fingerprint of the entity graph only; call [`clear`] after
/// switching membership predicates.
///
/// [`clear`]: AnalysisContext::clear
#[derive(Debug, Default)]
pub struct AnalysisContext {
    fingerprint: Option<u64>,
    report: Option<Arc<AnalysisReport>>,
    runs: usize,
    cache_hits: usize,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_report(&self) -> Option<&Arc<AnalysisReport>> {
        self.report.as_ref()
    }

    /// Runs that actually executed the pipeline
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    pub fn clear(&mut self) {
        self.fingerprint = None;
        self.report = None;
    }
}

pub struct ProjectAnalyzer {
    config: AnalysisConfig,
    pool: Option<ThreadPool>,
    duplication: DuplicationDetector,
    maintainability: MaintainabilityScorer,
    aggregator: ProjectAggregator,
}

impl ProjectAnalyzer {
    /// Validate the configuration and set up the worker pool
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let pool = if config.parallel {
            build_pool(config.workers)
        } else {
            None
        };

        Ok(Self {
            duplication: DuplicationDetector::new(config.duplication.clone())?,
            maintainability: MaintainabilityScorer::new(config.maintainability.clone()),
            aggregator: ProjectAggregator::from_config(&config),
            pool,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Whether runs go through the worker pool
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Analyze with every class of the graph counted as a project class
    pub fn analyze(&self, entities: &EntityGraph) -> AnalysisReport {
        self.analyze_with(entities, &AnyProjectClass)
    }

    pub fn analyze_with(
        &self,
        entities: &EntityGraph,
        membership: &dyn ProjectMembership,
    ) -> AnalysisReport {
        match &self.pool {
            Some(pool) => pool.install(|| self.run(entities, membership, true)),
            None => self.run(entities, membership, false),
        }
    }

    /// Reuse the context's report when the entity graph is unchanged
    pub fn analyze_cached(
        &self,
        ctx: &mut AnalysisContext,
        entities: &EntityGraph,
        membership: &dyn ProjectMembership,
    ) -> Arc<AnalysisReport> {
        let fingerprint = fingerprint(entities);
        if let (Some(fp), Some(cached_fp), Some(report)) =
            (fingerprint, ctx.fingerprint, ctx.report.as_ref())
        {
            if fp == cached_fp {
                debug!("Entity graph unchanged, reusing cached report");
                ctx.cache_hits += 1;
                return Arc::clone(report);
            }
        }

        let report = Arc::new(self.analyze_with(entities, membership));
        ctx.fingerprint = fingerprint;
        ctx.report = Some(Arc::clone(&report));
        ctx.runs += 1;
        report
    }

    fn run(
        &self,
        entities: &EntityGraph,
        membership: &dyn ProjectMembership,
        parallel: bool,
    ) -> AnalysisReport {
        let start = Instant::now();
        let graph = DependencyGraphBuilder::with_membership(membership).build(entities);

        let estimator =
            ComplexityEstimator::new(&self.config.complexity).with_parallel(parallel);
        let ((cycles, coupling), complexity) = if parallel {
            rayon::join(
                || {
                    rayon::join(
                        || CycleDetector.find_cycles(&graph),
                        || CouplingCalculator.calculate(&graph),
                    )
                },
                || estimator.estimate(entities),
            )
        } else {
            (
                (
                    CycleDetector.find_cycles(&graph),
                    CouplingCalculator.calculate(&graph),
                ),
                estimator.estimate(entities),
            )
        };

        let classes = self.class_metrics(&graph, &coupling, &complexity);
        let total_lines: u64 = classes.iter().map(|c| c.lines_of_code as u64).sum();

        let clusters = self
            .duplication
            .clone()
            .with_parallel(parallel)
            .detect(entities, total_lines);
        let usage = UsageAnalyzer.analyze_usage(entities);
        let statistics = InventoryCollector.collect(entities);

        let project = self.aggregator.aggregate(&AggregationInput {
            classes: &classes,
            clusters: &clusters,
            cycles: &cycles,
            unused_methods: usage.unused_count(),
        });

        let report = AnalysisReport {
            graph_summary: GraphSummarizer.summarize(&graph),
            edges: graph.edges(),
            cycles,
            classes,
            clusters,
            usage,
            project,
            statistics,
        };

        info!(
            "Analysis complete: {} classes, {} edges, {} cycles, {} duplication clusters in {:?}",
            report.classes.len(),
            report.edges.len(),
            report.cycles.len(),
            report.clusters.len(),
            start.elapsed()
        );
        report
    }

    fn class_metrics(
        &self,
        graph: &DependencyGraph,
        coupling: &[ClassCoupling],
        complexity: &[ClassComplexity],
    ) -> Vec<ClassMetrics> {
        complexity
            .iter()
            .map(|cx| {
                let (afferent, efferent) = graph
                    .id_of(&cx.class_name)
                    .and_then(|id| coupling.get(id))
                    .map_or((0, 0), |c| (c.afferent, c.efferent));
                ClassMetrics {
                    class_name: cx.class_name.clone(),
                    method_count: cx.method_count,
                    field_count: cx.field_count,
                    complexity: cx.complexity,
                    afferent_coupling: afferent,
                    efferent_coupling: efferent,
                    cohesion: cx.cohesion,
                    maintainability_index: self.maintainability.score(cx),
                    lines_of_code: cx.lines_of_code,
                    usage_count: afferent,
                }
            })
            .collect()
    }
}

fn build_pool(workers: Option<usize>) -> Option<ThreadPool> {
    let threads = workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4)
            .min(MAX_AUTO_WORKERS)
    });

    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("archmetrics-{}", i))
        .build()
    {
        Ok(pool) => {
            debug!("Analysis pool ready with {} threads", threads);
            Some(pool)
        }
        Err(e) => {
            warn!("Failed to build analysis pool ({}), running sequentially", e);
            None
        }
    }
}

fn fingerprint(entities: &EntityGraph) -> Option<u64> {
    match serde_json::to_vec(entities) {
        Ok(bytes) => Some(xxh3_64(&bytes)),
        Err(e) => {
            warn!("Could not fingerprint entity graph: {}", e);
            None
        }
    }
}
