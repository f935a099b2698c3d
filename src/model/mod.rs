//! Core data models
//!
//! `entity` holds the read-only input graph handed over by the parsing
//! collaborator; `records` holds the value records every analysis produces.

mod entity;
mod records;

pub use entity::{
    annotation_name, method_key, type_identifiers, ClassEntity, ClassKind, EntityGraph,
    FieldEntity, MethodCall, MethodEntity, ParameterEntity, ReferenceKind, TypeReference,
    Visibility,
};
pub use records::{
    ClassMetrics, ComplexityLevel, CycleGroup, DependencyEdge, DuplicationCluster, HealthGrade,
    MaintainabilityLevel, ProjectMetrics,
};
