//! Tree construction from node descriptors.
//!
//! The builder is the only path that produces a [`GornTree`]: it validates
//! the descriptor sequence, checks the structural closures, runs annotation
//! exactly once, and only then attaches movement. Hand-assembled trees can
//! bypass this, but everything file- or spec-driven goes through here.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::address::Address;
use crate::annotate::annotate;
use crate::errors::{MgError, MgResult};
use crate::node::GornNode;
use crate::tree::GornTree;

/// Boundary record describing one node, as produced by the notation parser
/// or any structured front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Gorn address as a digit string (root = empty string).
    pub address: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<bool>,
    /// Movement steps as (target address, feature) pairs, chain order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movement: Vec<(String, String)>,
}

impl NodeSpec {
    pub fn new(address: impl Into<String>, label: impl Into<String>) -> Self {
        NodeSpec {
            address: address.into(),
            label: label.into(),
            ..Default::default()
        }
    }
}

/// A movement arc given separately from the node descriptors:
/// (source, target, feature), ends by address or name.
pub type MoveSpec = (String, String, String);

#[derive(Debug, Default)]
pub struct TreeBuilder {
    name: String,
    specs: Vec<NodeSpec>,
    leaf_order: Option<Vec<String>>,
    movement: Vec<MoveSpec>,
}

impl TreeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        TreeBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn node(mut self, spec: NodeSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn nodes(mut self, specs: impl IntoIterator<Item = NodeSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    /// Surface order of the leaves. Without it the builder falls back to
    /// the structural left-to-right leaf order.
    pub fn leaf_order<S: Into<String>>(mut self, order: impl IntoIterator<Item = S>) -> Self {
        self.leaf_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn movement(mut self, movement: impl IntoIterator<Item = MoveSpec>) -> Self {
        self.movement.extend(movement);
        self
    }

    /// Validate, build, and annotate.
    ///
    /// Fails before annotation when a descriptor is malformed, an address is
    /// duplicated, the tree violates mother/left-sibling closure, or the
    /// leaf order does not cover exactly the tree's leaves.
    #[instrument(level = "debug", skip(self), fields(tree = %self.name))]
    pub fn build(self) -> MgResult<GornTree> {
        let mut tree = GornTree::new(self.name);
        let mut pending_moves: Vec<MoveSpec> = Vec::new();

        for spec in &self.specs {
            let address = Address::new(spec.address.clone())?;
            let mut node = GornNode::new(address, spec.label.clone());
            if let Some(name) = &spec.name {
                node.name = name.clone();
            }
            node.empty = spec.empty;
            node.content = spec.content;
            for (target, feature) in &spec.movement {
                pending_moves.push((spec.address.clone(), target.clone(), feature.clone()));
            }
            tree.add(node)?;
        }

        let linear = match &self.leaf_order {
            Some(order) => {
                let mut linear = Vec::with_capacity(order.len());
                for reference in order {
                    linear.push(tree.resolve(reference)?);
                }
                linear
            }
            None if tree.get(&Address::root()).is_some() => tree.leaves(&Address::root()),
            None => Vec::new(),
        };
        validate_leaf_cover(&tree, &linear)?;
        tree.set_linear(linear);

        annotate(&mut tree)?;

        pending_moves.extend(self.movement);
        for (source, target, feature) in &pending_moves {
            tree.add_mover(source, target, feature)?;
        }

        Ok(tree)
    }
}

/// Every leaf exactly once, and nothing but leaves.
fn validate_leaf_cover(tree: &GornTree, linear: &[Address]) -> MgResult<()> {
    if tree.is_empty() {
        return Ok(());
    }
    let mut seen = Vec::with_capacity(linear.len());
    for address in linear {
        tree.node(address)?;
        if !tree.is_leaf(address) {
            return Err(MgError::StructuralInconsistency {
                tree: tree.name.clone(),
                reason: format!("linear order contains non-leaf {}", address),
            });
        }
        if seen.contains(address) {
            return Err(MgError::StructuralInconsistency {
                tree: tree.name.clone(),
                reason: format!("linear order repeats leaf {}", address),
            });
        }
        seen.push(address.clone());
    }
    let leaf_count = tree.leaves(&Address::root()).len();
    if seen.len() != leaf_count {
        return Err(MgError::StructuralInconsistency {
            tree: tree.name.clone(),
            reason: format!(
                "linear order covers {} of {} leaves",
                seen.len(),
                leaf_count
            ),
        });
    }
    Ok(())
}
