//! Integration tests for the archmetrics pipeline
//!
//! These tests drive the public API the way a host application would:
//! - Entity graph handed over as JSON, analyzed end to end
//! - Configuration loaded from a directory
//! - Statistics applied to the per-class metric series
//! - Module descriptors assessed for dependency health
//! - Declaration counts and pattern search over an annotated graph

use archmetrics::config::ComplexityAggregation;
use archmetrics::metrics::DuplicationDetector;
use archmetrics::model::{ClassEntity, MethodEntity};
use archmetrics::modules::{ModuleAnalyzer, ModuleDescriptor};
use archmetrics::patterns::ElementKind;
use archmetrics::stats::CorrelationStrength;
use archmetrics::{
    load_config, AnalysisConfig, EntityGraph, HealthGrade, PatternSearch, ProjectAnalyzer,
    RiskLevel, StatisticsEngine,
};
use proptest::prelude::*;

const SHOP_JSON: &str = r#"{
  "classes": [
    {
      "name": "Cart",
      "package": "shop",
      "fields": [{ "name": "items", "type_name": "List<Item>" }],
      "methods": [{
        "name": "sum",
        "return_type": "int",
        "body": "int total = 0;\nfor (Item item : items) {\n    if (item.isActive()) {\n        total += item.price();\n    }\n}\nreturn total;",
        "accessed_fields": ["items"]
      }]
    },
    {
      "name": "Invoice",
      "package": "shop",
      "fields": [{ "name": "cart", "type_name": "Cart" }],
      "methods": [{
        "name": "sum",
        "return_type": "int",
        "body": "int total = 0;\nfor (Item item : items) {\n    if (item.isActive()) {\n        total += item.price();\n    }\n}\nreturn total;"
      }]
    },
    {
      "name": "Item",
      "package": "shop",
      "fields": [{ "name": "price", "type_name": "double" }],
      "methods": [{ "name": "price", "return_type": "double", "body": "return price;" }]
    }
  ]
}"#;

fn sequential() -> ProjectAnalyzer {
    ProjectAnalyzer::new(AnalysisConfig {
        parallel: false,
        ..Default::default()
    })
    .expect("default config is valid")
}

#[test]
fn test_json_graph_end_to_end() {
    let entities = EntityGraph::from_json(SHOP_JSON).expect("fixture parses");
    let report = sequential().analyze(&entities);

    assert_eq!(report.edges.len(), 2);
    assert!(report.cycles.is_empty());
    assert_eq!(report.graph_summary.layer_count(), 3);
    assert_eq!(report.graph_summary.layer_of("shop.Item"), Some(0));
    assert_eq!(report.graph_summary.layer_of("shop.Invoice"), Some(2));

    assert_eq!(report.clusters.len(), 1);
    let cluster = &report.clusters[0];
    assert!(!cluster.is_similar);
    assert_eq!(cluster.line_count, 7);
    assert_eq!(cluster.methods, vec!["shop.Cart.sum()", "shop.Invoice.sum()"]);
    assert_eq!(cluster.duplication_type(), "Exact Duplicate");

    let cart = report.class("shop.Cart").expect("Cart analyzed");
    assert_eq!(cart.complexity, 3.0);
    assert_eq!(cart.lines_of_code, 8);
    assert_eq!(cart.afferent_coupling, 1);
    assert_eq!(cart.efferent_coupling, 1);

    let project = &report.project;
    assert_eq!(project.total_classes, 3);
    assert_eq!(project.total_methods, 3);
    assert_eq!(project.total_lines_of_code, 18);
    assert!((project.duplication_ratio - 7.0 / 18.0).abs() < 1e-12);
    // Invoice has no dependents; no call data means no unused methods
    assert_eq!(project.unused_classes, 1);
    assert_eq!(project.unused_methods, 0);
    assert!(project.technical_debt_score > 0.0);
    assert!(report.health_score() < 100.0 * (1.0 - project.duplication_ratio));
}

#[test]
fn test_health_summary_and_recommendations() {
    let entities = EntityGraph::from_json(SHOP_JSON).expect("fixture parses");
    let report = sequential().analyze(&entities);

    let summary = report.project.summary();
    assert_eq!(summary["Health Grade"], report.health_grade().to_string());
    assert!(report
        .project
        .recommendations()
        .iter()
        .any(|r| r.contains("duplication")));
}

#[test]
fn test_config_loaded_from_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("archmetrics.toml"),
        "parallel = false\n\n[complexity]\naggregation = \"average\"\n",
    )
    .expect("write config");

    let config = load_config(dir.path());
    assert!(!config.parallel);
    assert_eq!(config.complexity.aggregation, ComplexityAggregation::Average);

    let analyzer = ProjectAnalyzer::new(config).expect("valid");
    assert!(!analyzer.is_parallel());

    let entities = EntityGraph::new(vec![ClassEntity::new("app", "Two")
        .with_method(MethodEntity::new("a").with_body("if (x) { y(); }"))
        .with_method(MethodEntity::new("b").with_body("return 1;"))]);
    let report = analyzer.analyze(&entities);
    assert_eq!(report.classes[0].complexity, 1.5);
}

#[test]
fn test_broken_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(
        dir.path().join("archmetrics.toml"),
        "[duplication]\nsimilarity_threshold = 3.0\n",
    )
    .expect("write config");
    let config = load_config(dir.path());
    assert_eq!(config.duplication.similarity_threshold, 0.85);
}

#[test]
fn test_statistics_over_class_series() {
    let classes: Vec<ClassEntity> = (1..=12)
        .map(|i| {
            let body = "if (a) { b(); }\n".repeat(i);
            ClassEntity::new("gen", &format!("C{:02}", i))
                .with_method(MethodEntity::new("run").with_body(&body))
        })
        .collect();
    let report = sequential().analyze(&EntityGraph::new(classes));

    let complexity: Vec<f64> = report.classes.iter().map(|c| c.complexity).collect();
    let loc: Vec<f64> = report.classes.iter().map(|c| c.lines_of_code as f64).collect();

    let engine = StatisticsEngine::default();
    let basic = engine.basic(&complexity);
    assert_eq!(basic.count, 12);
    assert_eq!(basic.min, 2.0);
    assert_eq!(basic.max, 13.0);

    let corr = engine.correlation(&loc, &complexity).expect("same length");
    assert!((corr.coefficient - 1.0).abs() < 1e-9);
    assert_eq!(corr.strength, CorrelationStrength::VeryStrong);
    assert!(corr.is_significant);

    let fit = engine.regression(&loc, &complexity).expect("well posed");
    assert!((fit.slope() - 1.0).abs() < 1e-9);
    assert!((fit.intercept - 1.0).abs() < 1e-9);

    let trend = engine.time_series(&complexity);
    assert!(trend.trend_slope > 0.0);
}

#[test]
fn test_module_tree_from_json() {
    let json = r#"{
      "name": "platform",
      "group": "org.example",
      "dependencies": [
        { "group": "org.junit", "artifact": "junit", "version": "5.10", "scope": "test" }
      ],
      "submodules": [
        {
          "name": "api",
          "dependencies": [
            { "group": "com.fasterxml", "artifact": "jackson", "version": "2.15", "outdated": true },
            { "group": "org.example", "artifact": "api", "version": "1.0" }
          ]
        }
      ]
    }"#;
    let root: ModuleDescriptor = serde_json::from_str(json).expect("module tree parses");
    let analyzer = ModuleAnalyzer::new();

    let modules = analyzer.analyze_tree(&root);
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[1].self_dependencies.len(), 1);

    let deps = analyzer.analyze_dependencies(&root);
    assert_eq!(deps.total_dependencies, 3);
    let health = analyzer.assess(&deps);
    // one of three outdated: 100 - 33.3 * 0.5
    assert!((health.health_score - 250.0 / 3.0).abs() < 1e-9);
    assert_eq!(health.health_grade, HealthGrade::B);
    assert_eq!(health.warnings, vec!["33.3% of dependencies are outdated"]);
}

const ANNOTATED_JSON: &str = r#"{
  "classes": [
    {
      "name": "Clock",
      "package": "time",
      "annotations": ["@Component"],
      "fields": [{ "name": "INSTANCE", "type_name": "Clock", "is_static": true }],
      "methods": [
        { "name": "Clock", "is_constructor": true, "visibility": "private" },
        { "name": "getInstance", "is_static": true, "return_type": "Clock" },
        { "name": "isRunning", "return_type": "boolean", "visibility": "public" }
      ]
    },
    {
      "name": "Zone",
      "package": "time",
      "kind": "interface",
      "methods": [{ "name": "offset", "return_type": "int", "visibility": "public" }]
    },
    {
      "name": "ClockSpec",
      "package": "time",
      "annotations": ["@org.junit.jupiter.api.extension.ExtendWith(MockitoExtension.class)", "@DisplayNameTest"],
      "methods": [
        { "name": "ticks", "annotations": ["@Test"], "visibility": "package" },
        { "name": "setUp", "annotations": ["@BeforeEach"], "visibility": "package" }
      ]
    }
  ]
}"#;

#[test]
fn test_declaration_counts_and_patterns() {
    let entities = EntityGraph::from_json(ANNOTATED_JSON).expect("fixture parses");
    let report = sequential().analyze(&entities);

    let stats = &report.statistics;
    assert_eq!(stats.total_classes, 2);
    assert_eq!(stats.total_interfaces, 1);
    assert_eq!(stats.total_constructors, 1);
    assert_eq!(stats.total_methods, 5);
    assert_eq!(stats.total_static_methods, 1);
    assert_eq!(stats.total_package_methods, 2);
    assert_eq!(stats.annotation_usage["Component"], 1);
    assert_eq!(stats.annotation_usage["ExtendWith"], 1);
    assert_eq!(stats.total_annotations, 5);
    assert_eq!(stats.package_distribution["time"], 3);

    let found = PatternSearch::default().search(&entities);
    let singleton = found.matches_for("Singleton");
    assert_eq!(singleton.len(), 1);
    assert_eq!(singleton[0].element_name, "time.Clock");

    let accessors: Vec<&str> = found
        .matches_for("GetterSetter")
        .iter()
        .map(|m| m.simple_name.as_str())
        .collect();
    assert_eq!(accessors, vec!["getInstance", "isRunning", "setUp"]);

    let tests = found.matches_for("TestClass");
    assert_eq!(tests.len(), 2);
    assert_eq!(tests[0].element_kind, ElementKind::Class);
    assert_eq!(tests[0].element_name, "time.ClockSpec");
    assert_eq!(tests[1].element_name, "time.ClockSpec.ticks");
}

#[test]
fn test_health_assessment_lists_risks() {
    let entities = EntityGraph::from_json(SHOP_JSON).expect("fixture parses");
    let assessment = sequential().analyze(&entities).assess_health();
    // 7 of 18 lines duplicated
    assert_eq!(assessment.risks.len(), 1);
    assert_eq!(assessment.risks[0].level, RiskLevel::Medium);
    assert_eq!(assessment.risks[0].description, "38.9% of code is duplicated");
    assert_eq!(assessment.highest_risk(), Some(RiskLevel::Medium));
}

fn body_strategy() -> impl Strategy<Value = String> {
    let vocab = ["x", "y", "=", "+", "1", ";", "call", "(", ")"];
    prop::collection::vec(0..vocab.len(), 8..24)
        .prop_map(move |picks| picks.iter().map(|&i| vocab[i]).collect::<Vec<_>>().join(" "))
}

proptest! {
    #[test]
    fn prop_duplication_is_idempotent(bodies in prop::collection::vec(body_strategy(), 2..10)) {
        let classes: Vec<ClassEntity> = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| {
                ClassEntity::new("p", &format!("K{}", i))
                    .with_method(MethodEntity::new("m").with_body(body))
            })
            .collect();
        let entities = EntityGraph::new(classes);
        let detector = DuplicationDetector::new(Default::default()).expect("valid");

        let first = detector.detect(&entities, 100);
        let second = detector.detect(&entities, 100);
        prop_assert_eq!(&first, &second);

        let mut seen_similar = false;
        for cluster in &first {
            prop_assert!(cluster.methods.len() >= 2);
            prop_assert!(cluster.impact >= 0.0 && cluster.impact <= 1.0);
            if cluster.is_similar {
                seen_similar = true;
            } else {
                prop_assert!(!seen_similar, "exact clusters come first");
            }
        }
    }
}
