//! Processing contrasts and their evaluation against metric batteries.

use std::collections::BTreeSet;
use std::rc::Rc;

use tracing::instrument;

use crate::errors::MgResult;
use crate::metrics::{MetricComparison, RankedMetric, Verdict};
use crate::tree::GornTree;

/// An empirically attested contrast: `winner` is processed with less
/// difficulty than `loser`. Trees are shared so that metric values are
/// memoized across every contrast mentioning the same tree.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub name: String,
    pub winner: Rc<GornTree>,
    pub loser: Rc<GornTree>,
}

/// Result of one contrast: every tested metric classified into exactly one
/// of success/tie/failure, plus per-metric value traces. Rebuilt from
/// scratch by every `compare` call.
#[derive(Debug, Clone, Default)]
pub struct ComparisonOutcome {
    pub name: String,
    pub traces: Vec<MetricComparison>,
    pub success: BTreeSet<String>,
    pub tie: BTreeSet<String>,
    pub failure: BTreeSet<String>,
}

impl Comparison {
    pub fn new(name: impl Into<String>, winner: Rc<GornTree>, loser: Rc<GornTree>) -> Self {
        Comparison {
            name: name.into(),
            winner,
            loser,
        }
    }

    /// Test every metric on this contrast.
    #[instrument(level = "debug", skip_all, fields(contrast = %self.name))]
    pub fn compare(&self, metrics: &[RankedMetric]) -> MgResult<ComparisonOutcome> {
        let mut outcome = ComparisonOutcome {
            name: self.name.clone(),
            ..Default::default()
        };
        for metric in metrics {
            let trace = metric.compare(&self.winner, &self.loser)?;
            let bucket = match trace.verdict {
                Verdict::Success => &mut outcome.success,
                Verdict::Tie => &mut outcome.tie,
                Verdict::Failure => &mut outcome.failure,
            };
            bucket.insert(trace.metric.clone());
            outcome.traces.push(trace);
        }
        Ok(outcome)
    }
}

/// Aggregate result over a whole comparison set.
#[derive(Debug, Clone, Default)]
pub struct SetOutcome {
    pub name: String,
    pub outcomes: Vec<ComparisonOutcome>,
    /// Metrics successful on every contrast.
    pub success: BTreeSet<String>,
    /// Metrics that never fail but are not uniformly successful.
    pub tie: BTreeSet<String>,
    /// Metrics that failed at least one contrast.
    pub failure: BTreeSet<String>,
}

/// A named collection of contrasts plus the metrics tested against all of
/// them.
#[derive(Debug, Default)]
pub struct ComparisonSet {
    pub name: String,
    comparisons: Vec<Comparison>,
    metrics: Vec<RankedMetric>,
}

impl ComparisonSet {
    pub fn new(name: impl Into<String>) -> Self {
        ComparisonSet {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, comparison: Comparison) {
        self.comparisons.push(comparison);
    }

    pub fn add_metric(&mut self, metric: RankedMetric) {
        self.metrics.push(metric);
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn metrics(&self) -> &[RankedMetric] {
        &self.metrics
    }

    /// Run every contrast and aggregate.
    ///
    /// The aggregation is deliberately asymmetric: one failure anywhere
    /// disqualifies a metric (union), full success requires unanimity
    /// (intersection), and everything else ties overall.
    #[instrument(level = "debug", skip(self), fields(set = %self.name))]
    pub fn compare(&self) -> MgResult<SetOutcome> {
        let mut result = SetOutcome {
            name: self.name.clone(),
            ..Default::default()
        };
        for comparison in &self.comparisons {
            result.outcomes.push(comparison.compare(&self.metrics)?);
        }

        let tested: BTreeSet<String> = self.metrics.iter().map(|m| m.name()).collect();

        result.success = result
            .outcomes
            .iter()
            .map(|o| o.success.clone())
            .reduce(|acc, s| acc.intersection(&s).cloned().collect())
            .unwrap_or_default();
        result.failure = result
            .outcomes
            .iter()
            .flat_map(|o| o.failure.iter().cloned())
            .collect();
        result.tie = tested
            .difference(&result.success.union(&result.failure).cloned().collect())
            .cloned()
            .collect();

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{NodeSpec, TreeBuilder};
    use crate::metrics::{Metric, MetricSpec};
    use crate::registry::ReducerRegistry;
    use crate::values::LoadType;

    fn ditransitive(name: &str, leaf_order: &[&str]) -> Rc<GornTree> {
        let specs: Vec<NodeSpec> = [
            ("", "S"),
            ("1", "NP"),
            ("2", "VP"),
            ("11", "the"),
            ("12", "man"),
            ("21", "gave"),
            ("22", "NP"),
            ("221", "Bill"),
            ("23", "NP"),
            ("231", "a"),
            ("232", "book"),
        ]
        .iter()
        .map(|(a, l)| NodeSpec::new(*a, *l))
        .collect();
        Rc::new(
            TreeBuilder::new(name)
                .nodes(specs)
                .leaf_order(leaf_order.iter().copied())
                .build()
                .unwrap(),
        )
    }

    fn max_tenure(registry: &ReducerRegistry) -> RankedMetric {
        Metric::from_spec(
            &MetricSpec {
                name: "MaxT".into(),
                load_type: LoadType::Tenure,
                operator: "max".into(),
                ..Default::default()
            },
            registry,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn a_metric_lands_in_exactly_one_bucket_per_contrast() {
        let registry = ReducerRegistry::with_defaults();
        let canonical = ditransitive("canonical", &["11", "12", "21", "221", "231", "232"]);
        let scrambled = ditransitive("scrambled", &["231", "232", "11", "12", "21", "221"]);

        let contrast = Comparison::new("fronting", Rc::clone(&canonical), Rc::clone(&scrambled));
        let outcome = contrast.compare(&[max_tenure(&registry)]).unwrap();

        assert!(outcome.success.contains("MaxT"));
        assert!(outcome.tie.is_empty());
        assert!(outcome.failure.is_empty());
        assert_eq!(outcome.traces.len(), 1);
    }

    #[test]
    fn one_failure_disqualifies_across_the_set() {
        let registry = ReducerRegistry::with_defaults();
        let canonical = ditransitive("canonical", &["11", "12", "21", "221", "231", "232"]);
        let scrambled = ditransitive("scrambled", &["231", "232", "11", "12", "21", "221"]);

        let mut set = ComparisonSet::new("both-directions");
        set.add_metric(max_tenure(&registry));
        set.add(Comparison::new(
            "right-way",
            Rc::clone(&canonical),
            Rc::clone(&scrambled),
        ));
        set.add(Comparison::new(
            "wrong-way",
            Rc::clone(&scrambled),
            Rc::clone(&canonical),
        ));

        let result = set.compare().unwrap();
        assert!(result.failure.contains("MaxT"));
        assert!(!result.success.contains("MaxT"));
        assert!(!result.tie.contains("MaxT"));
    }

    #[test]
    fn success_somewhere_plus_tie_elsewhere_is_an_overall_tie() {
        let registry = ReducerRegistry::with_defaults();
        let canonical = ditransitive("canonical", &["11", "12", "21", "221", "231", "232"]);
        let scrambled = ditransitive("scrambled", &["231", "232", "11", "12", "21", "221"]);

        let mut set = ComparisonSet::new("mixed");
        set.add_metric(max_tenure(&registry));
        set.add(Comparison::new(
            "decided",
            Rc::clone(&canonical),
            Rc::clone(&scrambled),
        ));
        set.add(Comparison::new(
            "self-tie",
            Rc::clone(&canonical),
            Rc::clone(&canonical),
        ));

        let result = set.compare().unwrap();
        assert!(result.tie.contains("MaxT"));
        assert!(result.success.is_empty());
        assert!(result.failure.is_empty());
    }
}
