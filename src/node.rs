//! Tree node entity with optional classification and annotation fields.

use crate::address::Address;

/// A single tree node.
///
/// Classification flags (`empty`, `leaf`, `content`) and the index/outdex
/// annotation start out unset and are filled in during tree construction;
/// there is no separate "annotated node" type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GornNode {
    pub address: Address,
    pub label: String,
    /// Display/reference name, defaults to `t` + address.
    pub name: String,
    /// Unpronounced (empty) head? Unset until classified.
    pub empty: Option<bool>,
    /// Set to `Some(false)` for interior nodes during classification.
    pub leaf: Option<bool>,
    /// Content word (as opposed to functional material)?
    pub content: Option<bool>,
    /// Ordered movement chain: intermediate landing sites first, the final
    /// target last. Each step carries the feature that triggered it.
    pub movement: Vec<(Address, String)>,
    pub index: Option<u32>,
    pub outdex: Option<u32>,
}

impl GornNode {
    pub fn new(address: Address, label: impl Into<String>) -> Self {
        let name = format!("t{}", address);
        GornNode {
            address,
            label: label.into(),
            name,
            empty: None,
            leaf: None,
            content: None,
            movement: Vec::new(),
            index: None,
            outdex: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Record a movement step to `target`. A repeated target replaces the
    /// feature recorded for it without changing the step's chain position.
    pub fn record_move(&mut self, target: Address, feature: impl Into<String>) {
        let feature = feature.into();
        match self.movement.iter_mut().find(|(t, _)| *t == target) {
            Some(step) => step.1 = feature,
            None => self.movement.push((target, feature)),
        }
    }

    /// The final landing site of the node's movement chain, if it moves.
    pub fn final_move(&self) -> Option<&(Address, String)> {
        self.movement.last()
    }

    /// How long the node stays open during processing: outdex − index.
    pub fn tenure(&self) -> Option<u32> {
        match (self.index, self.outdex) {
            (Some(i), Some(o)) => Some(o - i),
            _ => None,
        }
    }

    /// Does the node fall under the given node-type token?
    ///
    /// Exactly one of `I` (interior), `U` (unpronounced leaf), `P`
    /// (pronounced leaf) holds for a classified node, independently combined
    /// with `F` (functional) or `C` (content). Unknown tokens never match:
    /// filter vocabularies are open-ended and unrecognized codes simply
    /// select nothing.
    pub fn matches_type(&self, token: &str) -> bool {
        match token {
            "I" => self.leaf == Some(false),
            "U" => self.leaf != Some(false) && self.empty == Some(true),
            "P" => self.leaf != Some(false) && self.empty != Some(true),
            "C" => self.content == Some(true),
            "F" => self.content != Some(true),
            _ => false,
        }
    }

    /// Does the node fall under at least one of the tokens? An empty filter
    /// list matches nothing.
    pub fn matches_any_type<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        tokens.iter().any(|t| self.matches_type(t.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_node(empty: Option<bool>, content: Option<bool>) -> GornNode {
        let mut node = GornNode::new(Address::new("11").unwrap(), "the");
        node.leaf = Some(true);
        node.empty = empty;
        node.content = content;
        node
    }

    #[test]
    fn default_name_derives_from_address() {
        let node = GornNode::new(Address::new("231").unwrap(), "book");
        assert_eq!(node.name, "t231");
        assert_eq!(
            GornNode::new(Address::root(), "S").name,
            "t"
        );
    }

    #[test]
    fn type_tokens_partition_leaf_status() {
        let mut node = leaf_node(Some(true), None);
        assert!(node.matches_type("U"));
        assert!(!node.matches_type("I"));
        assert!(!node.matches_type("P"));

        node.empty = Some(false);
        assert!(node.matches_type("P"));

        node.leaf = Some(false);
        assert!(node.matches_type("I"));
        assert!(!node.matches_type("P"));
    }

    #[test]
    fn content_flag_is_orthogonal() {
        let node = leaf_node(None, Some(true));
        assert!(node.matches_type("C"));
        assert!(!node.matches_type("F"));
        assert!(leaf_node(None, None).matches_type("F"));
    }

    #[test]
    fn unknown_tokens_never_match() {
        let node = leaf_node(Some(true), Some(true));
        assert!(!node.matches_type("X"));
        assert!(!node.matches_any_type(&["X", "Q"]));
        assert!(node.matches_any_type(&["X", "U"]));
        assert!(!node.matches_any_type::<&str>(&[]));
    }

    #[test]
    fn repeated_move_target_replaces_feature_in_place() {
        let mut node = GornNode::new(Address::new("122").unwrap(), "NP");
        node.record_move(Address::new("12").unwrap(), "acc");
        node.record_move(Address::root(), "top");
        node.record_move(Address::new("12").unwrap(), "nom");

        assert_eq!(node.movement.len(), 2);
        assert_eq!(node.movement[0].1, "nom");
        assert_eq!(node.final_move().unwrap().0, Address::root());
    }

    #[test]
    fn tenure_requires_full_annotation() {
        let mut node = GornNode::new(Address::root(), "S");
        assert_eq!(node.tenure(), None);
        node.index = Some(1);
        node.outdex = Some(4);
        assert_eq!(node.tenure(), Some(3));
    }
}
