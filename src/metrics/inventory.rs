//! Declaration counts over the entity graph
//!
//! Interfaces and enums are counted apart from classes; records and
//! annotation types count as classes. Constructors are counted apart from
//! methods, so the visibility and static tallies cover methods only.
//! Lines of code follow the per-class rule used by complexity estimation
//! (one per field plus each method's lines).

use crate::analyzer::Analyzer;
use crate::model::{annotation_name, ClassKind, EntityGraph, Visibility};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Key used for classes in the default package
pub const DEFAULT_PACKAGE: &str = "(default)";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStatistics {
    pub total_classes: usize,
    pub total_interfaces: usize,
    pub total_enums: usize,
    pub total_abstract_classes: usize,
    pub total_package_private_classes: usize,
    pub total_methods: usize,
    pub total_constructors: usize,
    pub total_fields: usize,
    pub total_public_methods: usize,
    pub total_protected_methods: usize,
    pub total_package_methods: usize,
    pub total_private_methods: usize,
    pub total_static_methods: usize,
    pub total_static_fields: usize,
    /// Class, field and method annotations
    pub total_annotations: usize,
    pub total_lines_of_code: u64,
    /// Simple annotation name -> occurrences
    pub annotation_usage: BTreeMap<String, usize>,
    /// Package -> declared types
    pub package_distribution: BTreeMap<String, usize>,
}

impl ProjectStatistics {
    /// Every declared type, whatever its kind
    pub fn total_types(&self) -> usize {
        self.total_classes + self.total_interfaces + self.total_enums
    }

    /// Most used annotations, ties broken by name
    pub fn top_annotations(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .annotation_usage
            .iter()
            .map(|(name, &count)| (name.as_str(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryCollector;

impl InventoryCollector {
    pub fn collect(&self, entities: &EntityGraph) -> ProjectStatistics {
        let mut stats = ProjectStatistics::default();

        for class in &entities.classes {
            match class.kind {
                ClassKind::Interface => stats.total_interfaces += 1,
                ClassKind::Enum => stats.total_enums += 1,
                ClassKind::Class | ClassKind::Record | ClassKind::Annotation => {
                    stats.total_classes += 1;
                    if class.is_abstract {
                        stats.total_abstract_classes += 1;
                    }
                }
            }
            if class.is_package_private {
                stats.total_package_private_classes += 1;
            }

            let package = if class.package.is_empty() {
                DEFAULT_PACKAGE
            } else {
                class.package.as_str()
            };
            *stats
                .package_distribution
                .entry(package.to_string())
                .or_insert(0) += 1;

            let mut lines = class.fields.len() as u64;
            let annotations = class
                .annotations
                .iter()
                .chain(class.fields.iter().flat_map(|f| f.annotations.iter()))
                .chain(class.methods.iter().flat_map(|m| m.annotations.iter()));
            for annotation in annotations {
                stats.total_annotations += 1;
                *stats
                    .annotation_usage
                    .entry(annotation_name(annotation).to_string())
                    .or_insert(0) += 1;
            }

            stats.total_fields += class.fields.len();
            stats.total_static_fields += class.fields.iter().filter(|f| f.is_static).count();

            for method in &class.methods {
                lines += method.loc() as u64;
                if method.is_constructor {
                    stats.total_constructors += 1;
                    continue;
                }
                stats.total_methods += 1;
                if method.is_static {
                    stats.total_static_methods += 1;
                }
                match method.visibility {
                    Visibility::Public => stats.total_public_methods += 1,
                    Visibility::Protected => stats.total_protected_methods += 1,
                    Visibility::Package => stats.total_package_methods += 1,
                    Visibility::Private => stats.total_private_methods += 1,
                }
            }
            stats.total_lines_of_code += lines;
        }

        debug!(
            "Inventory: {} types in {} packages, {} methods, {} annotations",
            stats.total_types(),
            stats.package_distribution.len(),
            stats.total_methods,
            stats.total_annotations
        );
        stats
    }
}

impl Analyzer<EntityGraph, ProjectStatistics> for InventoryCollector {
    fn analyze(&self, entities: &EntityGraph) -> ProjectStatistics {
        self.collect(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassEntity, MethodEntity};

    fn billing() -> EntityGraph {
        let gateway = ClassEntity::new("com.pay", "Gateway").with_kind(ClassKind::Interface);
        let status = ClassEntity::new("com.pay", "Status").with_kind(ClassKind::Enum);
        let base = ClassEntity::new("com.pay", "BaseProcessor")
            .with_abstract(true)
            .with_annotation("@Component")
            .with_field("gateway", "Gateway")
            .with_method(MethodEntity::constructor("BaseProcessor").with_body("init();"))
            .with_method(
                MethodEntity::new("charge")
                    .with_annotation("@Transactional")
                    .with_body("gateway.send();\nlog();"),
            )
            .with_method(
                MethodEntity::new("audit")
                    .with_visibility(Visibility::Protected)
                    .with_static(true)
                    .with_lines(4),
            );
        let helper = ClassEntity::new("", "Helper")
            .with_package_private(true)
            .with_annotation("@Component")
            .with_static_field("CACHE", "Map<String, String>")
            .with_method(MethodEntity::new("clear").with_visibility(Visibility::Private));
        EntityGraph::new(vec![gateway, status, base, helper])
    }

    #[test]
    fn test_counts_by_kind() {
        let stats = InventoryCollector.collect(&billing());
        assert_eq!(stats.total_classes, 2);
        assert_eq!(stats.total_interfaces, 1);
        assert_eq!(stats.total_enums, 1);
        assert_eq!(stats.total_types(), 4);
        assert_eq!(stats.total_abstract_classes, 1);
        assert_eq!(stats.total_package_private_classes, 1);
    }

    #[test]
    fn test_member_tallies() {
        let stats = InventoryCollector.collect(&billing());
        assert_eq!(stats.total_constructors, 1);
        assert_eq!(stats.total_methods, 3);
        assert_eq!(stats.total_public_methods, 1);
        assert_eq!(stats.total_protected_methods, 1);
        assert_eq!(stats.total_private_methods, 1);
        assert_eq!(stats.total_package_methods, 0);
        assert_eq!(stats.total_static_methods, 1);
        assert_eq!(stats.total_fields, 2);
        assert_eq!(stats.total_static_fields, 1);
        // fields 1 + 1, bodies 1 + 2, explicit 4
        assert_eq!(stats.total_lines_of_code, 9);
    }

    #[test]
    fn test_annotation_usage_and_packages() {
        let stats = InventoryCollector.collect(&billing());
        assert_eq!(stats.total_annotations, 3);
        assert_eq!(stats.annotation_usage["Component"], 2);
        assert_eq!(stats.annotation_usage["Transactional"], 1);
        assert_eq!(stats.top_annotations(1), vec![("Component", 2)]);

        assert_eq!(stats.package_distribution["com.pay"], 3);
        assert_eq!(stats.package_distribution[DEFAULT_PACKAGE], 1);
    }

    #[test]
    fn test_empty_graph() {
        let stats = InventoryCollector.analyze(&EntityGraph::default());
        assert_eq!(stats, ProjectStatistics::default());
        assert!(stats.top_annotations(5).is_empty());
    }
}
