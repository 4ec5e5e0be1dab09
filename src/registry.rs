//! Named reducing operators.
//!
//! Metric specifications refer to operators by name; the registry maps those
//! names onto functions. Callers can register their own reducers before
//! building metrics, which replaces ad-hoc code loading: an unknown name is
//! a hard error, never an excuse to evaluate arbitrary text.

use std::collections::BTreeMap;

use crate::errors::{MgError, MgResult};
use crate::values::MetricValue;

/// A reducing operator over extracted load values.
pub type ReducerFn = fn(&[u32]) -> MetricValue;

/// The operator used when a metric specification leaves the field blank:
/// all values in descending order, compared lexicographically.
pub const DEFAULT_OPERATOR: &str = "sorted";

pub struct ReducerRegistry {
    reducers: BTreeMap<String, ReducerFn>,
}

impl Default for ReducerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ReducerRegistry {
    /// Registry with the standard operators: `max`, `sum`, `count`, `avg`,
    /// and `sorted`.
    pub fn with_defaults() -> Self {
        let mut registry = ReducerRegistry {
            reducers: BTreeMap::new(),
        };
        registry.register("max", safemax);
        registry.register("sum", total);
        registry.register("count", count);
        registry.register("avg", average);
        registry.register(DEFAULT_OPERATOR, sorted_descending);
        registry
    }

    /// Register a reducer under a name, replacing any previous binding.
    pub fn register(&mut self, name: impl Into<String>, reducer: ReducerFn) {
        self.reducers.insert(name.into(), reducer);
    }

    /// Resolve an operator name. An empty name selects the default operator.
    pub fn resolve(&self, name: &str) -> MgResult<ReducerFn> {
        let name = if name.is_empty() { DEFAULT_OPERATOR } else { name };
        self.reducers
            .get(name)
            .copied()
            .ok_or_else(|| MgError::UnregisteredOperator(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.reducers.keys().map(|s| s.as_str())
    }
}

/// max that returns 0 on an empty collection
fn safemax(values: &[u32]) -> MetricValue {
    MetricValue::Int(values.iter().copied().max().unwrap_or(0) as i64)
}

fn total(values: &[u32]) -> MetricValue {
    MetricValue::Int(values.iter().map(|&v| v as i64).sum())
}

fn count(values: &[u32]) -> MetricValue {
    MetricValue::Int(values.len() as i64)
}

/// average with a safe division: an empty collection averages to 0
fn average(values: &[u32]) -> MetricValue {
    let divisor = values.len();
    if divisor == 0 {
        MetricValue::Float(0.0)
    } else {
        let sum: i64 = values.iter().map(|&v| v as i64).sum();
        MetricValue::Float(sum as f64 / divisor as f64)
    }
}

fn sorted_descending(values: &[u32]) -> MetricValue {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    MetricValue::Vector(sorted)
}
