//! Metrics over annotated trees and their ranked (tie-breaking) composition.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{MgError, MgResult};
use crate::registry::{ReducerFn, ReducerRegistry};
use crate::tree::GornTree;
use crate::values::{memory_measure, LoadType, MetricValue, RankedValue};

/// Configuration record for a single metric, the shape metric files and
/// structured front ends produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub name: String,
    pub load_type: LoadType,
    /// Operator name resolved against the reducer registry; empty selects
    /// the default (descending sort).
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub trivial: bool,
    #[serde(default)]
    pub filters: Vec<String>,
}

/// A reusable evaluator: a load type, a reducing operator, node-type
/// filters, and the trivial-inclusion flag. Immutable once built.
#[derive(Clone)]
pub struct Metric {
    name: String,
    load_type: LoadType,
    operator_name: String,
    operator: ReducerFn,
    trivial: bool,
    filters: Vec<String>,
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metric")
            .field("name", &self.name)
            .field("load_type", &self.load_type)
            .field("operator", &self.operator_name)
            .field("trivial", &self.trivial)
            .field("filters", &self.filters)
            .finish()
    }
}

impl Metric {
    /// Build a metric from its configuration record, resolving the operator
    /// name against `registry`.
    pub fn from_spec(spec: &MetricSpec, registry: &ReducerRegistry) -> MgResult<Self> {
        Ok(Metric {
            name: spec.name.clone(),
            load_type: spec.load_type,
            operator: registry.resolve(&spec.operator)?,
            operator_name: spec.operator.clone(),
            trivial: spec.trivial,
            filters: spec.filters.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Compute the metric value for an annotated tree.
    pub fn eval(&self, tree: &GornTree) -> MgResult<MetricValue> {
        memory_measure(
            tree,
            self.operator,
            self.load_type,
            &self.filters,
            self.trivial,
        )
    }
}

/// How a metric fares on a single processing contrast.
///
/// The three verdicts form a chain Success > Tie > Failure; in the
/// two-boolean reading of the original literature they are (true, true),
/// (false, true) and (false, false), and [`meet`](Verdict::meet) is the
/// component-wise AND. A metric stays viable over many contrasts only as
/// long as the meet of all its verdicts stays above Failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Failure,
    Tie,
    Success,
}

impl Verdict {
    /// Verdict for a (desired winner, desired loser) value pair: lower
    /// memory load must go to the winner.
    pub fn from_values(winner: &MetricValue, loser: &MetricValue) -> Option<Verdict> {
        winner.partial_cmp(loser).map(|ord| match ord {
            std::cmp::Ordering::Less => Verdict::Success,
            std::cmp::Ordering::Equal => Verdict::Tie,
            std::cmp::Ordering::Greater => Verdict::Failure,
        })
    }

    /// Greatest lower bound of two verdicts.
    pub fn meet(self, other: Verdict) -> Verdict {
        self.min(other)
    }

    /// The (captured, not-falsified) boolean pair of the original notation.
    pub fn as_pair(self) -> (bool, bool) {
        match self {
            Verdict::Success => (true, true),
            Verdict::Tie => (false, true),
            Verdict::Failure => (false, false),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "success"),
            Verdict::Tie => write!(f, "tie"),
            Verdict::Failure => write!(f, "failure"),
        }
    }
}

/// Value trace of one metric on one contrast, for tabular reporting.
#[derive(Debug, Clone)]
pub struct MetricComparison {
    pub metric: String,
    pub winner_value: RankedValue,
    pub loser_value: RankedValue,
    pub verdict: Verdict,
}

/// An ordered cascade of metrics.
///
/// Comparison walks the components in order; the first non-tie verdict
/// decides, and only an all-tie run is a tie overall. Every component is
/// always evaluated (values are memoized per tree), so cascade
/// short-circuiting never hides an evaluation error.
#[derive(Debug, Clone)]
pub struct RankedMetric {
    metrics: Vec<Metric>,
}

impl RankedMetric {
    pub fn new(metrics: Vec<Metric>) -> MgResult<Self> {
        if metrics.is_empty() {
            return Err(MgError::Spec("ranked metric needs at least one component".into()));
        }
        Ok(RankedMetric { metrics })
    }

    pub fn components(&self) -> &[Metric] {
        &self.metrics
    }

    /// Display name: component names joined by " > ".
    pub fn name(&self) -> String {
        self.metrics
            .iter()
            .map(Metric::name)
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// Filter signature: each component's sorted filter tokens concatenated,
    /// components joined by ">". Used for display and deduplication.
    pub fn filter_signature(&self) -> String {
        self.metrics
            .iter()
            .map(|m| {
                let mut tokens: Vec<&str> = m.filters.iter().map(String::as_str).collect();
                tokens.sort_unstable();
                tokens.concat()
            })
            .collect::<Vec<_>>()
            .join(">")
    }

    /// Evaluate all components on a tree, one value per component.
    /// Memoized on the tree's profile under this metric's name.
    pub fn eval(&self, tree: &GornTree) -> MgResult<RankedValue> {
        let key = self.name();
        if let Some(cached) = tree.cached_metric(&key) {
            return Ok(cached);
        }
        let value: RankedValue = self
            .metrics
            .iter()
            .map(|m| m.eval(tree))
            .collect::<MgResult<_>>()?;
        tree.memoize_metric(&key, value.clone());
        Ok(value)
    }

    /// Compare a desired winner against a desired loser, cascading through
    /// the components until one breaks the tie.
    pub fn compare(&self, winner: &GornTree, loser: &GornTree) -> MgResult<MetricComparison> {
        let winner_value = self.eval(winner)?;
        let loser_value = self.eval(loser)?;

        let mut verdict = Verdict::Tie;
        for (w, l) in winner_value.iter().zip(loser_value.iter()) {
            let step = Verdict::from_values(w, l).ok_or_else(|| MgError::IncomparableValues {
                metric: self.name(),
                left: w.to_string(),
                right: l.to_string(),
            })?;
            if step != Verdict::Tie {
                verdict = step;
                break;
            }
        }

        Ok(MetricComparison {
            metric: self.name(),
            winner_value,
            loser_value,
            verdict,
        })
    }
}

impl From<Metric> for RankedMetric {
    fn from(metric: Metric) -> Self {
        RankedMetric {
            metrics: vec![metric],
        }
    }
}
