//! Structural pattern search over the entity graph
//!
//! A [`CodePattern`] decides per class and per method whether the element
//! matches. [`PatternSearch`] runs a set of patterns over every class and
//! every method and groups the hits by pattern name. No body text is
//! inspected; every predicate works on declarations only.

use crate::analyzer::Analyzer;
use crate::model::{type_identifiers, ClassEntity, EntityGraph, MethodEntity, Visibility};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// A named predicate over classes and methods
pub trait CodePattern: Send + Sync {
    /// Unique name, used as the result key
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn matches_class(&self, class: &ClassEntity) -> bool;

    fn matches_method(&self, class: &ClassEntity, method: &MethodEntity) -> bool;
}

/// Private constructor plus a static field holding the class's own type
#[derive(Debug, Clone, Copy, Default)]
pub struct SingletonPattern;

impl CodePattern for SingletonPattern {
    fn name(&self) -> &'static str {
        "Singleton"
    }

    fn description(&self) -> &'static str {
        "Classes implementing singleton pattern"
    }

    fn matches_class(&self, class: &ClassEntity) -> bool {
        let private_constructor = class
            .constructors()
            .any(|c| c.visibility == Visibility::Private);
        let qualified = class.qualified_name();
        let static_instance = class.fields.iter().any(|f| {
            f.is_static
                && type_identifiers(&f.type_name)
                    .first()
                    .is_some_and(|t| *t == class.name || *t == qualified)
        });
        private_constructor && static_instance
    }

    fn matches_method(&self, _class: &ClassEntity, _method: &MethodEntity) -> bool {
        false
    }
}

/// `get*`, `set*` and `is*` methods with at most one parameter
#[derive(Debug, Clone, Copy, Default)]
pub struct GetterSetterPattern;

impl CodePattern for GetterSetterPattern {
    fn name(&self) -> &'static str {
        "GetterSetter"
    }

    fn description(&self) -> &'static str {
        "Getter and setter methods"
    }

    fn matches_class(&self, _class: &ClassEntity) -> bool {
        false
    }

    fn matches_method(&self, _class: &ClassEntity, method: &MethodEntity) -> bool {
        let name = method.name.as_str();
        !method.is_constructor
            && (name.starts_with("get") || name.starts_with("set") || name.starts_with("is"))
            && method.parameters.len() <= 1
    }
}

/// Test classes by name or annotation, test methods by `@Test`
#[derive(Debug, Clone, Copy, Default)]
pub struct TestClassPattern;

impl CodePattern for TestClassPattern {
    fn name(&self) -> &'static str {
        "TestClass"
    }

    fn description(&self) -> &'static str {
        "Test classes"
    }

    fn matches_class(&self, class: &ClassEntity) -> bool {
        class.is_test_class()
    }

    fn matches_method(&self, _class: &ClassEntity, method: &MethodEntity) -> bool {
        method.is_test()
    }
}

/// The three built-in patterns
pub fn default_patterns() -> Vec<Box<dyn CodePattern>> {
    vec![
        Box::new(SingletonPattern),
        Box::new(GetterSetterPattern),
        Box::new(TestClassPattern),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Class,
    Method,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Class => write!(f, "class"),
            ElementKind::Method => write!(f, "method"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternMatch {
    pub pattern: String,
    /// `pkg.Class` for classes, `pkg.Class.method` for methods
    pub element_name: String,
    pub element_kind: ElementKind,
    pub simple_name: String,
}

/// Matches grouped by pattern name; every searched pattern has an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternSearchResult {
    pub matches: BTreeMap<String, Vec<PatternMatch>>,
}

impl PatternSearchResult {
    pub fn total_matches(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    pub fn matches_for(&self, pattern: &str) -> &[PatternMatch] {
        self.matches.get(pattern).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Runs a fixed set of patterns
pub struct PatternSearch {
    patterns: Vec<Box<dyn CodePattern>>,
}

impl PatternSearch {
    pub fn new(patterns: Vec<Box<dyn CodePattern>>) -> Self {
        Self { patterns }
    }

    pub fn pattern_names(&self) -> Vec<&'static str> {
        self.patterns.iter().map(|p| p.name()).collect()
    }

    /// Class hits precede the hits among that class's methods; classes and
    /// methods keep entity-graph order
    pub fn search(&self, entities: &EntityGraph) -> PatternSearchResult {
        let mut matches = BTreeMap::new();

        for pattern in &self.patterns {
            let mut hits = Vec::new();
            for class in &entities.classes {
                let qualified = class.qualified_name();
                if pattern.matches_class(class) {
                    hits.push(PatternMatch {
                        pattern: pattern.name().to_string(),
                        element_name: qualified.clone(),
                        element_kind: ElementKind::Class,
                        simple_name: class.name.clone(),
                    });
                }
                for method in &class.methods {
                    if pattern.matches_method(class, method) {
                        hits.push(PatternMatch {
                            pattern: pattern.name().to_string(),
                            element_name: method.key(&qualified),
                            element_kind: ElementKind::Method,
                            simple_name: method.name.clone(),
                        });
                    }
                }
            }
            debug!("Pattern {}: {} matches", pattern.name(), hits.len());
            matches.insert(pattern.name().to_string(), hits);
        }

        PatternSearchResult { matches }
    }
}

impl Default for PatternSearch {
    fn default() -> Self {
        Self::new(default_patterns())
    }
}

impl Analyzer<EntityGraph, PatternSearchResult> for PatternSearch {
    fn analyze(&self, entities: &EntityGraph) -> PatternSearchResult {
        self.search(entities)
    }
}
