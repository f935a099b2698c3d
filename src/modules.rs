//! Build-module dependency analysis
//!
//! Consumes module descriptors handed over by the build resolver (a tree of
//! modules, each with a flat list of declared dependencies) and reports scope
//! breakdowns, self-dependencies, version conflicts and an overall dependency
//! health grade. Only counting and grouping happen here; resolution of
//! transitive trees and version/vulnerability lookups stay with the resolver,
//! which reports them through the `outdated` and `vulnerable` flags.
//!
//! # Health Formula
//!
//! ```text
//! score = 100
//!       - outdated_percentage * 0.5
//!       - 5  * version_conflicts
//!       - 10 * vulnerable_dependencies
//! ```
//!
//! Floored at 0 and graded like the project health score (A >= 90 ... F).

use crate::analyzer::Analyzer;
use crate::model::HealthGrade;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

const OUTDATED_WEIGHT: f64 = 0.5;
const CONFLICT_PENALTY: f64 = 5.0;
const VULNERABILITY_PENALTY: f64 = 10.0;

/// Outdated share (percent) above which the finding is critical
const OUTDATED_CRITICAL: f64 = 50.0;
/// Outdated share (percent) above which the finding is a warning
const OUTDATED_WARNING: f64 = 25.0;

/// Outdated artifacts named in the update recommendation
const UPDATE_SHORTLIST: usize = 3;

const UNKNOWN_GROUP: &str = "unknown";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyScope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl DependencyScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyScope::Compile => "compile",
            DependencyScope::Provided => "provided",
            DependencyScope::Runtime => "runtime",
            DependencyScope::Test => "test",
            DependencyScope::System => "system",
            DependencyScope::Import => "import",
        }
    }

    /// Supplied by the build environment rather than packaged
    pub fn is_build_only(&self) -> bool {
        matches!(self, DependencyScope::Provided | DependencyScope::System)
    }
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dependency as declared in a module manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    pub group: String,
    pub artifact: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub scope: DependencyScope,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub outdated: bool,
    #[serde(default)]
    pub vulnerable: bool,
}

impl DeclaredDependency {
    pub fn new(group: &str, artifact: &str, version: &str, scope: DependencyScope) -> Self {
        Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            scope,
            optional: false,
            outdated: false,
            vulnerable: false,
        }
    }

    /// `group:artifact`
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

/// A build module with its declared dependencies and nested submodules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    /// Inherited from the enclosing module when absent
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DeclaredDependency>,
    #[serde(default)]
    pub submodules: Vec<ModuleDescriptor>,
}

impl ModuleDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn with_dependency(mut self, dependency: DeclaredDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_submodule(mut self, module: ModuleDescriptor) -> Self {
        self.submodules.push(module);
        self
    }

    /// Modules of the tree in pre-order, each paired with its effective group
    pub fn walk(&self) -> Vec<(&ModuleDescriptor, &str)> {
        let mut out = Vec::new();
        let mut stack = vec![(self, self.group.as_deref().unwrap_or(UNKNOWN_GROUP))];
        while let Some((module, group)) = stack.pop() {
            out.push((module, group));
            for sub in module.submodules.iter().rev() {
                stack.push((sub, sub.group.as_deref().unwrap_or(group)));
            }
        }
        out
    }

    /// Levels in the tree; a module without submodules has depth 1
    pub fn depth(&self) -> usize {
        1 + self
            .submodules
            .iter()
            .map(ModuleDescriptor::depth)
            .max()
            .unwrap_or(0)
    }

    /// Declared dependencies of every module in the tree, pre-order
    pub fn all_dependencies(&self) -> Vec<&DeclaredDependency> {
        self.walk()
            .into_iter()
            .flat_map(|(m, _)| m.dependencies.iter())
            .collect()
    }
}

/// Per-module breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleAnalysis {
    pub module_name: String,
    pub dependency_count: usize,
    pub submodule_count: usize,
    /// Dependencies pointing back at the module itself
    pub self_dependencies: Vec<String>,
    pub scope_breakdown: BTreeMap<String, usize>,
    pub has_test_dependencies: bool,
    pub has_build_dependencies: bool,
}

/// Shape of a module tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStructureAnalysis {
    pub total_modules: usize,
    pub max_depth: usize,
    /// Pre-order
    pub module_analyses: Vec<ModuleAnalysis>,
    /// Modules that aggregate submodules
    pub root_modules: Vec<String>,
    /// Modules without submodules
    pub leaf_modules: Vec<String>,
    pub average_dependencies_per_module: f64,
}

impl ProjectStructureAnalysis {
    pub fn module(&self, name: &str) -> Option<&ModuleAnalysis> {
        self.module_analyses.iter().find(|m| m.module_name == name)
    }

    pub fn is_multi_module(&self) -> bool {
        self.total_modules > 1
    }
}

/// Whole-tree roll-up
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyAnalysis {
    pub total_dependencies: usize,
    pub scope_distribution: BTreeMap<String, usize>,
    /// Coordinates of outdated dependencies, declaration order
    pub outdated: Vec<String>,
    /// Coordinate -> distinct declared versions, for coordinates declared with more than one
    pub version_conflicts: BTreeMap<String, Vec<String>>,
    pub vulnerable: Vec<String>,
    pub outdated_percentage: f64,
}

impl DependencyAnalysis {
    fn scope_count(&self, scope: DependencyScope) -> usize {
        self.scope_distribution
            .get(scope.as_str())
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyHealthAssessment {
    pub health_score: f64,
    pub health_grade: HealthGrade,
    pub critical_issues: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    /// Factor -> remaining score after that factor's penalty
    pub score_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleAnalyzer;

impl ModuleAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Breakdown of one module's own declarations (submodules not included)
    pub fn analyze_module(&self, module: &ModuleDescriptor) -> ModuleAnalysis {
        let group = module.group.as_deref().unwrap_or(UNKNOWN_GROUP);
        module_analysis(module, group)
    }

    /// One breakdown per module of the tree, pre-order
    pub fn analyze_tree(&self, root: &ModuleDescriptor) -> Vec<ModuleAnalysis> {
        root.walk()
            .into_iter()
            .map(|(module, group)| module_analysis(module, group))
            .collect()
    }

    pub fn analyze_structure(&self, root: &ModuleDescriptor) -> ProjectStructureAnalysis {
        let walked = root.walk();
        let module_analyses = self.analyze_tree(root);

        let (aggregators, leaves): (Vec<_>, Vec<_>) = walked
            .iter()
            .map(|(module, _)| *module)
            .partition(|module| !module.submodules.is_empty());

        let total_modules = walked.len();
        let total_dependencies: usize = module_analyses.iter().map(|m| m.dependency_count).sum();
        let structure = ProjectStructureAnalysis {
            total_modules,
            max_depth: root.depth(),
            root_modules: aggregators.iter().map(|m| m.name.clone()).collect(),
            leaf_modules: leaves.iter().map(|m| m.name.clone()).collect(),
            average_dependencies_per_module: total_dependencies as f64 / total_modules as f64,
            module_analyses,
        };

        debug!(
            "Module tree '{}': {} modules, depth {}, {} leaves",
            root.name,
            structure.total_modules,
            structure.max_depth,
            structure.leaf_modules.len()
        );
        structure
    }

    pub fn analyze_dependencies(&self, root: &ModuleDescriptor) -> DependencyAnalysis {
        let all = root.all_dependencies();

        let mut scope_distribution = BTreeMap::new();
        let mut versions: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
        for dep in &all {
            *scope_distribution
                .entry(dep.scope.as_str().to_string())
                .or_insert(0) += 1;
            versions
                .entry(dep.coordinate())
                .or_default()
                .insert(dep.version.as_str());
        }

        let version_conflicts: BTreeMap<String, Vec<String>> = versions
            .into_iter()
            .filter(|(_, v)| v.len() > 1)
            .map(|(coord, v)| (coord, v.into_iter().map(str::to_string).collect()))
            .collect();

        let outdated: Vec<String> = all
            .iter()
            .filter(|d| d.outdated)
            .map(|d| d.coordinate())
            .collect();
        let vulnerable: Vec<String> = all
            .iter()
            .filter(|d| d.vulnerable)
            .map(|d| d.coordinate())
            .collect();

        let outdated_percentage = if all.is_empty() {
            0.0
        } else {
            outdated.len() as f64 * 100.0 / all.len() as f64
        };

        debug!(
            "Module tree '{}': {} dependencies, {} outdated ({:.1}%), {} conflicts, {} vulnerable",
            root.name,
            all.len(),
            outdated.len(),
            outdated_percentage,
            version_conflicts.len(),
            vulnerable.len()
        );

        DependencyAnalysis {
            total_dependencies: all.len(),
            scope_distribution,
            outdated,
            version_conflicts,
            vulnerable,
            outdated_percentage,
        }
    }

    pub fn assess(&self, analysis: &DependencyAnalysis) -> DependencyHealthAssessment {
        let mut score = 100.0;
        let mut critical_issues = Vec::new();
        let mut warnings = Vec::new();
        let mut recommendations = Vec::new();
        let mut score_breakdown = BTreeMap::new();

        let outdated_penalty = analysis.outdated_percentage * OUTDATED_WEIGHT;
        score -= outdated_penalty;
        score_breakdown.insert("outdated_dependencies".to_string(), 100.0 - outdated_penalty);
        let outdated_msg = format!(
            "{:.1}% of dependencies are outdated",
            analysis.outdated_percentage
        );
        if analysis.outdated_percentage > OUTDATED_CRITICAL {
            critical_issues.push(outdated_msg);
        } else if analysis.outdated_percentage > OUTDATED_WARNING {
            warnings.push(outdated_msg);
        }

        let conflicts = analysis.version_conflicts.len();
        let conflict_penalty = conflicts as f64 * CONFLICT_PENALTY;
        score -= conflict_penalty;
        score_breakdown.insert(
            "version_conflicts".to_string(),
            (100.0 - conflict_penalty).max(0.0),
        );
        if conflicts > 0 {
            warnings.push(format!("{} dependencies have version conflicts", conflicts));
            recommendations.push("Align dependency versions across modules".to_string());
        }

        let vulnerabilities = analysis.vulnerable.len();
        let security_penalty = vulnerabilities as f64 * VULNERABILITY_PENALTY;
        score -= security_penalty;
        score_breakdown.insert("security".to_string(), (100.0 - security_penalty).max(0.0));
        if vulnerabilities > 0 {
            critical_issues.push(format!(
                "{} security vulnerabilities found",
                vulnerabilities
            ));
            recommendations.push("Update vulnerable dependencies immediately".to_string());
        }

        if analysis.scope_count(DependencyScope::Compile) > 0
            && analysis.scope_count(DependencyScope::Test) == 0
        {
            warnings.push("No test dependencies found".to_string());
            recommendations.push("Add test dependencies for better test coverage".to_string());
        }

        if !analysis.outdated.is_empty() {
            let shortlist: Vec<&str> = analysis
                .outdated
                .iter()
                .take(UPDATE_SHORTLIST)
                .map(String::as_str)
                .collect();
            recommendations.push(format!(
                "Update the following dependencies: {}",
                shortlist.join(", ")
            ));
        }

        let health_score = f64::max(score, 0.0);
        DependencyHealthAssessment {
            health_score,
            health_grade: HealthGrade::from_score(health_score),
            critical_issues,
            warnings,
            recommendations,
            score_breakdown,
        }
    }
}

fn module_analysis(module: &ModuleDescriptor, group: &str) -> ModuleAnalysis {
    let own = format!("{}:{}", group, module.name);

    let mut scope_breakdown: BTreeMap<String, usize> = BTreeMap::new();
    for dep in &module.dependencies {
        *scope_breakdown.entry(dep.scope.as_str().to_string()).or_insert(0) += 1;
    }

    let self_dependencies = module
        .dependencies
        .iter()
        .map(DeclaredDependency::coordinate)
        .filter(|coord| *coord == own)
        .map(|coord| format!("Self-dependency: {}", coord))
        .collect();

    ModuleAnalysis {
        module_name: module.name.clone(),
        dependency_count: module.dependencies.len(),
        submodule_count: module.submodules.len(),
        self_dependencies,
        has_test_dependencies: module
            .dependencies
            .iter()
            .any(|d| d.scope == DependencyScope::Test),
        has_build_dependencies: module.dependencies.iter().any(|d| d.scope.is_build_only()),
        scope_breakdown,
    }
}

impl Analyzer<ModuleDescriptor, ModuleAnalysis> for ModuleAnalyzer {
    fn analyze(&self, module: &ModuleDescriptor) -> ModuleAnalysis {
        self.analyze_module(module)
    }
}

impl Analyzer<ModuleDescriptor, DependencyAnalysis> for ModuleAnalyzer {
    fn analyze(&self, root: &ModuleDescriptor) -> DependencyAnalysis {
        self.analyze_dependencies(root)
    }
}

impl Analyzer<ModuleDescriptor, ProjectStructureAnalysis> for ModuleAnalyzer {
    fn analyze(&self, root: &ModuleDescriptor) -> ProjectStructureAnalysis {
        self.analyze_structure(root)
    }
}

impl Analyzer<DependencyAnalysis, DependencyHealthAssessment> for ModuleAnalyzer {
    fn analyze(&self, analysis: &DependencyAnalysis) -> DependencyHealthAssessment {
        self.assess(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(group: &str, artifact: &str, version: &str, scope: DependencyScope) -> DeclaredDependency {
        DeclaredDependency::new(group, artifact, version, scope)
    }

    fn project() -> ModuleDescriptor {
        let mut guava = dep("com.google", "guava", "31.0", DependencyScope::Compile);
        guava.outdated = true;
        let mut log4j = dep("org.apache", "log4j", "2.14", DependencyScope::Compile);
        log4j.vulnerable = true;

        ModuleDescriptor::new("app")
            .with_group("com.acme")
            .with_dependency(dep("junit", "junit", "4.13", DependencyScope::Test))
            .with_dependency(guava)
            .with_submodule(
                ModuleDescriptor::new("core")
                    .with_dependency(dep("com.google", "guava", "32.0", DependencyScope::Compile))
                    .with_dependency(log4j)
                    .with_dependency(dep("com.acme", "core", "1.0", DependencyScope::Provided)),
            )
    }

    #[test]
    fn test_walk_inherits_group() {
        let root = project();
        let walked: Vec<(&str, &str)> = root
            .walk()
            .into_iter()
            .map(|(m, g)| (m.name.as_str(), g))
            .collect();
        assert_eq!(walked, vec![("app", "com.acme"), ("core", "com.acme")]);
        assert_eq!(root.all_dependencies().len(), 5);
    }

    #[test]
    fn test_module_breakdown() {
        let analyzer = ModuleAnalyzer::new();
        let tree = analyzer.analyze_tree(&project());
        assert_eq!(tree.len(), 2);

        let app = &tree[0];
        assert_eq!(app.dependency_count, 2);
        assert_eq!(app.submodule_count, 1);
        assert!(app.has_test_dependencies);
        assert!(!app.has_build_dependencies);
        assert!(app.self_dependencies.is_empty());

        let core = &tree[1];
        assert_eq!(core.scope_breakdown["compile"], 2);
        assert_eq!(core.scope_breakdown["provided"], 1);
        assert!(core.has_build_dependencies);
        assert_eq!(core.self_dependencies, vec!["Self-dependency: com.acme:core"]);
    }

    #[test]
    fn test_structure_of_nested_tree() {
        let tree = project().with_submodule(
            ModuleDescriptor::new("services")
                .with_dependency(dep("io.netty", "netty", "4.1", DependencyScope::Compile))
                .with_submodule(
                    ModuleDescriptor::new("billing").with_submodule(
                        ModuleDescriptor::new("invoices")
                            .with_dependency(dep("com.acme", "core", "1.0", DependencyScope::Compile)),
                    ),
                ),
        );
        let structure = ModuleAnalyzer::new().analyze_structure(&tree);

        assert_eq!(structure.total_modules, 5);
        assert_eq!(structure.max_depth, 4);
        assert!(structure.is_multi_module());
        assert_eq!(structure.root_modules, vec!["app", "services", "billing"]);
        assert_eq!(structure.leaf_modules, vec!["core", "invoices"]);
        // 2 + 3 + 1 + 0 + 1 dependencies over 5 modules
        assert!((structure.average_dependencies_per_module - 1.4).abs() < 1e-12);

        let names: Vec<&str> = structure
            .module_analyses
            .iter()
            .map(|m| m.module_name.as_str())
            .collect();
        assert_eq!(names, vec!["app", "core", "services", "billing", "invoices"]);
        assert_eq!(structure.module("billing").unwrap().submodule_count, 1);
        assert!(structure.module("missing").is_none());
    }

    #[test]
    fn test_structure_of_single_module() {
        let module = ModuleDescriptor::new("solo")
            .with_dependency(dep("io.netty", "netty", "4.1", DependencyScope::Compile));
        let structure: ProjectStructureAnalysis = ModuleAnalyzer::new().analyze(&module);
        assert_eq!(structure.total_modules, 1);
        assert_eq!(structure.max_depth, 1);
        assert!(!structure.is_multi_module());
        assert!(structure.root_modules.is_empty());
        assert_eq!(structure.leaf_modules, vec!["solo"]);
        assert_eq!(structure.average_dependencies_per_module, 1.0);
    }

    #[test]
    fn test_standalone_module_without_group() {
        let module = ModuleDescriptor::new("lib")
            .with_dependency(dep("unknown", "lib", "1", DependencyScope::Compile));
        let analysis = ModuleAnalyzer::new().analyze_module(&module);
        assert_eq!(analysis.self_dependencies.len(), 1);
    }

    #[test]
    fn test_dependency_rollup() {
        let analysis = ModuleAnalyzer::new().analyze_dependencies(&project());
        assert_eq!(analysis.total_dependencies, 5);
        assert_eq!(analysis.scope_distribution["compile"], 3);
        assert_eq!(analysis.outdated, vec!["com.google:guava"]);
        assert_eq!(analysis.vulnerable, vec!["org.apache:log4j"]);
        assert_eq!(
            analysis.version_conflicts["com.google:guava"],
            vec!["31.0".to_string(), "32.0".to_string()]
        );
        assert!((analysis.outdated_percentage - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_health_assessment() {
        let analyzer = ModuleAnalyzer::new();
        let analysis = analyzer.analyze_dependencies(&project());
        let health = analyzer.assess(&analysis);

        // 100 - 20 * 0.5 - 5 - 10
        assert!((health.health_score - 75.0).abs() < 1e-12);
        assert_eq!(health.health_grade, HealthGrade::C);
        assert_eq!(health.critical_issues, vec!["1 security vulnerabilities found"]);
        assert_eq!(health.warnings, vec!["1 dependencies have version conflicts"]);
        assert_eq!(health.recommendations.len(), 3);
        assert!(health.recommendations[2].ends_with("com.google:guava"));
        assert_eq!(health.score_breakdown["outdated_dependencies"], 90.0);
        assert_eq!(health.score_breakdown["security"], 90.0);
    }

    #[test]
    fn test_missing_test_dependencies_warned() {
        let module = ModuleDescriptor::new("svc")
            .with_dependency(dep("io.netty", "netty", "4.1", DependencyScope::Compile));
        let analyzer = ModuleAnalyzer::new();
        let health = analyzer.assess(&analyzer.analyze_dependencies(&module));
        assert_eq!(health.health_score, 100.0);
        assert_eq!(health.health_grade, HealthGrade::A);
        assert_eq!(health.warnings, vec!["No test dependencies found"]);
    }

    #[test]
    fn test_score_floor_and_empty_tree() {
        let mut module = ModuleDescriptor::new("legacy");
        for i in 0..12 {
            let mut d = dep("org.old", &format!("lib{}", i), "0.1", DependencyScope::Test);
            d.vulnerable = true;
            d.outdated = true;
            module.dependencies.push(d);
        }
        let analyzer = ModuleAnalyzer::new();
        let health = analyzer.assess(&analyzer.analyze_dependencies(&module));
        assert_eq!(health.health_score, 0.0);
        assert_eq!(health.health_grade, HealthGrade::F);
        assert_eq!(health.critical_issues.len(), 2);

        let empty = analyzer.analyze_dependencies(&ModuleDescriptor::new("empty"));
        assert_eq!(empty.total_dependencies, 0);
        assert_eq!(empty.outdated_percentage, 0.0);
        assert_eq!(analyzer.assess(&empty).health_score, 100.0);
    }

    #[test]
    fn test_scope_serde_lowercase() {
        let json = r#"{"group":"g","artifact":"a","scope":"test"}"#;
        let parsed: DeclaredDependency = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.scope, DependencyScope::Test);
        assert!(!parsed.optional);
        assert_eq!(parsed.version, "");
    }
}
