//! Raw memory-load value extraction from annotated trees.
//!
//! Two families of values feed every metric: tenure (how long a node stays
//! open, per node) and movement size (index distance of a movement step, per
//! step). `memory_measure` pairs an extractor with a reducing operator.
//!
//! Metric   | Operator        | Memory Type
//! ---------|-----------------|----------------
//! MaxT     | max             | tenure_extract
//! SumT     | sum             | tenure_extract
//! BoxT     | count           | tenure_extract
//! AvgT     | avg             | tenure_extract
//! MaxTR    | sorted          | tenure_extract
//! ---------------------------------------------
//! MaxS     | max             | move_extract
//! SumS     | sum             | move_extract
//! Movers   | count           | move_extract
//! AvgS     | avg             | move_extract
//! MaxSR    | sorted          | move_extract

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::errors::{MgError, MgResult};
use crate::registry::ReducerFn;
use crate::tree::GornTree;

/// A single metric value: a scalar or, for recursive (tie-breaking inside a
/// single metric) variants, a descending vector compared lexicographically.
#[derive(Debug, Clone)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Vector(Vec<u32>),
}

/// One value per component of a ranked metric.
pub type RankedValue = Vec<MetricValue>;

impl PartialEq for MetricValue {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for MetricValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use MetricValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Vector(a), Vector(b)) => a.partial_cmp(b),
            // a vector never compares against a scalar
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Int(v) => write!(f, "{}", v),
            MetricValue::Float(v) => write!(f, "{:.2}", v),
            MetricValue::Vector(vs) => {
                write!(f, "[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Which raw value family a metric draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadType {
    Tenure,
    Size,
}

impl Default for LoadType {
    fn default() -> Self {
        LoadType::Tenure
    }
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadType::Tenure => write!(f, "tenure"),
            LoadType::Size => write!(f, "size"),
        }
    }
}

impl FromStr for LoadType {
    type Err = MgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tenure" => Ok(LoadType::Tenure),
            "size" | "movement" => Ok(LoadType::Size),
            other => Err(MgError::Spec(format!("unknown load type {:?}", other))),
        }
    }
}

/// Identifier of one movement step: who moves where, under which feature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MoveStep {
    pub source: Address,
    pub target: Address,
    pub feature: String,
}

impl fmt::Display for MoveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.source, self.target, self.feature)
    }
}

/// Tenure values for all nodes of an annotated tree, keyed by address.
///
/// Nodes matching one of the filtered-out type tokens are skipped, as are
/// nodes at or below the tenure threshold: 2 normally (tenure 1 and 2 arise
/// for every node by mere traversal), 0 when `trivial` asks for everything.
pub fn tenure_extract<S: AsRef<str>>(
    tree: &GornTree,
    filters: &[S],
    trivial: bool,
) -> BTreeMap<Address, u32> {
    let threshold = if trivial { 0 } else { 2 };
    tree.iter()
        .filter(|node| !node.matches_any_type(filters))
        .filter_map(|node| {
            let tenure = node.tenure()?;
            (tenure > threshold).then(|| (node.address.clone(), tenure))
        })
        .collect()
}

/// Movement distances for all movers of an annotated tree, keyed by step.
///
/// Only the final landing site of each chain counts unless `trivial`
/// includes the intermediate steps too. Filters name movement features to
/// ignore. Distance is measured in index units between source and target.
pub fn move_extract<S: AsRef<str>>(
    tree: &GornTree,
    filters: &[S],
    trivial: bool,
) -> MgResult<BTreeMap<MoveStep, u32>> {
    let mut steps = BTreeMap::new();
    for node in tree.movers() {
        let chain: &[(Address, String)] = if trivial {
            &node.movement
        } else {
            std::slice::from_ref(node.final_move().expect("movers have a final step"))
        };
        for (target, feature) in chain {
            if filters.iter().any(|f| f.as_ref() == feature.as_str()) {
                continue;
            }
            let target_node = tree.node(target)?;
            if let (Some(from), Some(to)) = (node.index, target_node.index) {
                steps.insert(
                    MoveStep {
                        source: node.address.clone(),
                        target: target.clone(),
                        feature: feature.clone(),
                    },
                    from.abs_diff(to),
                );
            }
        }
    }
    Ok(steps)
}

/// Compute a processing-complexity value for an annotated tree.
///
/// Selects the extractor for `load_type`, applies `filters`/`trivial`, and
/// reduces the extracted values with `operator`.
pub fn memory_measure<S: AsRef<str>>(
    tree: &GornTree,
    operator: ReducerFn,
    load_type: LoadType,
    filters: &[S],
    trivial: bool,
) -> MgResult<MetricValue> {
    let values: Vec<u32> = match load_type {
        LoadType::Tenure => tenure_extract(tree, filters, trivial).into_values().collect(),
        LoadType::Size => move_extract(tree, filters, trivial)?.into_values().collect(),
    };
    Ok(operator(&values))
}
