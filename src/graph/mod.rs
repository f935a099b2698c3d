//! Class dependency graph
//!
//! - `builder`: entity graph -> weighted index adjacency table
//! - `cycles`: circular dependency groups (Tarjan SCC)
//! - `layers`: size, density, package dependencies, layering

mod builder;
mod cycles;
mod layers;

pub use builder::{AnyProjectClass, DependencyGraph, DependencyGraphBuilder, ProjectMembership};
pub use cycles::CycleDetector;
pub use layers::{GraphSummarizer, GraphSummary};
