//! The analyzer capability
//!
//! One operation, many data sources: every concrete analysis (coupling,
//! complexity, duplication, statistics, ...) implements `Analyzer` for the
//! input it consumes and the record it produces. Dispatch is static; a type
//! may implement the trait for several input/output pairs.

/// A pure analysis from an input to a freshly allocated output record
pub trait Analyzer<I: ?Sized, O> {
    fn analyze(&self, input: &I) -> O;
}
