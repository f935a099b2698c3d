//! Method usage from the call graph
//!
//! Calls are matched on the overload-insensitive key `pkg.Class.method`, so
//! every overload of a method shares one call count. Recursive calls do not
//! count as usage. `main` methods and methods of test classes are entry
//! points and are never reported unused.

use crate::analyzer::Analyzer;
use crate::model::{method_key, EntityGraph};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Calls above which a method is a hotspot
pub const HOTSPOT_CALLS: usize = 50;
/// Distinct calling classes above which a method is a hotspot
pub const HOTSPOT_CALLERS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum UsageLevel {
    Unused,
    RarelyUsed,
    OccasionallyUsed,
    FrequentlyUsed,
    HeavilyUsed,
}

impl UsageLevel {
    pub fn from_calls(calls: usize) -> Self {
        match calls {
            0 => UsageLevel::Unused,
            1 => UsageLevel::RarelyUsed,
            2..=4 => UsageLevel::OccasionallyUsed,
            5..=19 => UsageLevel::FrequentlyUsed,
            _ => UsageLevel::HeavilyUsed,
        }
    }
}

impl fmt::Display for UsageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UsageLevel::Unused => "Unused",
            UsageLevel::RarelyUsed => "Rarely Used",
            UsageLevel::OccasionallyUsed => "Occasionally Used",
            UsageLevel::FrequentlyUsed => "Frequently Used",
            UsageLevel::HeavilyUsed => "Heavily Used",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodUsage {
    /// `pkg.Class.name(T1,T2)`
    pub method_id: String,
    pub class_name: String,
    pub call_count: usize,
    /// Distinct classes calling this method
    pub caller_classes: usize,
    pub is_entry_point: bool,
}

impl MethodUsage {
    pub fn level(&self) -> UsageLevel {
        UsageLevel::from_calls(self.call_count)
    }

    pub fn is_hotspot(&self) -> bool {
        self.call_count > HOTSPOT_CALLS || self.caller_classes > HOTSPOT_CALLERS
    }

    pub fn is_unused(&self) -> bool {
        self.call_count == 0 && !self.is_entry_point
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsageReport {
    /// False when the entity graph carried no call data
    pub has_call_data: bool,
    /// One entry per method, in entity-graph order
    pub methods: Vec<MethodUsage>,
}

impl UsageReport {
    pub fn unused(&self) -> impl Iterator<Item = &MethodUsage> {
        self.methods.iter().filter(|m| m.is_unused())
    }

    /// 0 when no call data was supplied
    pub fn unused_count(&self) -> usize {
        if self.has_call_data {
            self.unused().count()
        } else {
            0
        }
    }

    pub fn hotspots(&self) -> Vec<&MethodUsage> {
        self.methods.iter().filter(|m| m.is_hotspot()).collect()
    }

    /// The `n` most called methods, ties broken by entity-graph order
    pub fn most_called(&self, n: usize) -> Vec<&MethodUsage> {
        let mut sorted: Vec<&MethodUsage> =
            self.methods.iter().filter(|m| m.call_count > 0).collect();
        sorted.sort_by(|a, b| b.call_count.cmp(&a.call_count));
        sorted.truncate(n);
        sorted
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UsageAnalyzer;

impl UsageAnalyzer {
    pub fn analyze_usage(&self, entities: &EntityGraph) -> UsageReport {
        let Some(calls) = entities.method_calls.as_ref() else {
            debug!("No call graph supplied, skipping method usage");
            return UsageReport::default();
        };

        let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
        let mut callers: FxHashMap<&str, FxHashSet<&str>> = FxHashMap::default();
        for call in calls {
            let callee = method_key(&call.callee);
            let caller = method_key(&call.caller);
            if callee == caller {
                continue;
            }
            *counts.entry(callee).or_insert(0) += 1;
            callers
                .entry(callee)
                .or_default()
                .insert(owning_class(caller));
        }

        let mut methods = Vec::with_capacity(entities.method_count());
        for class in &entities.classes {
            let qualified = class.qualified_name();
            let test_class = class.is_test_class();
            for method in &class.methods {
                let key = method.key(&qualified);
                methods.push(MethodUsage {
                    method_id: method.id(&qualified),
                    class_name: qualified.clone(),
                    call_count: counts.get(key.as_str()).copied().unwrap_or(0),
                    caller_classes: callers.get(key.as_str()).map_or(0, |c| c.len()),
                    is_entry_point: test_class || method.is_main(),
                });
            }
        }

        let report = UsageReport {
            has_call_data: true,
            methods,
        };
        debug!(
            "Method usage: {} calls, {} methods, {} unused",
            calls.len(),
            report.methods.len(),
            report.unused_count()
        );
        report
    }
}

impl Analyzer<EntityGraph, UsageReport> for UsageAnalyzer {
    fn analyze(&self, entities: &EntityGraph) -> UsageReport {
        self.analyze_usage(entities)
    }
}

fn owning_class(method_key: &str) -> &str {
    method_key
        .rsplit_once('.')
        .map_or(method_key, |(class, _)| class)
}
