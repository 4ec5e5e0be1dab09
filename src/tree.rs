//! Flat trees keyed by Gorn addresses.
//!
//! A [`GornTree`] stores its nodes in a `BTreeMap<Address, GornNode>`, so the
//! address space is always iterated in sorted (structural left-to-right)
//! order. Surface word order lives in a separate `linear` sequence of leaf
//! addresses, which movement may decouple from structural order.

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::instrument;

use crate::address::Address;
use crate::errors::{MgError, MgResult};
use crate::node::GornNode;
use crate::values::RankedValue;

#[derive(Debug, Default)]
pub struct GornTree {
    pub name: String,
    nodes: BTreeMap<Address, GornNode>,
    /// Surface order of the leaf addresses.
    linear: Vec<Address>,
    annotated: bool,
    /// Per-metric value cache, keyed by metric name. Fill-if-absent, never
    /// invalidated: trees are immutable once annotated.
    profile: RefCell<BTreeMap<String, RankedValue>>,
}

impl GornTree {
    pub fn new(name: impl Into<String>) -> Self {
        GornTree {
            name: name.into(),
            ..Default::default()
        }
    }

    ///////////////////////////
    //  Adding/Removing Nodes //
    ///////////////////////////

    pub fn add(&mut self, node: GornNode) -> MgResult<()> {
        if self.nodes.contains_key(&node.address) {
            return Err(MgError::DuplicateAddress(node.address.to_string()));
        }
        self.nodes.insert(node.address.clone(), node);
        Ok(())
    }

    /// Remove a node if present. A removed leaf is dropped from the surface
    /// order, or replaced by its mother when it had no siblings (the mother
    /// has become a leaf). Careless removal can still leave the address
    /// domain inconsistent; `check_consistency` will report that.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, address: &Address) {
        if let Some(pos) = self.linear.iter().position(|a| a == address) {
            if self.has_siblings(address) {
                self.linear.remove(pos);
            } else if let Some(mother) = address.mother() {
                self.linear[pos] = mother;
            } else {
                self.linear.remove(pos);
            }
        }
        self.nodes.remove(address);
    }

    ///////////////////
    //  Getting Nodes //
    ///////////////////

    pub fn get(&self, address: &Address) -> Option<&GornNode> {
        self.nodes.get(address)
    }

    pub(crate) fn get_mut(&mut self, address: &Address) -> Option<&mut GornNode> {
        self.nodes.get_mut(address)
    }

    /// Like [`get`](Self::get) but with a typed error for absent addresses.
    pub fn node(&self, address: &Address) -> MgResult<&GornNode> {
        self.get(address)
            .ok_or_else(|| MgError::UnknownAddress(address.to_string()))
    }

    pub fn by_name(&self, name: &str) -> Option<&GornNode> {
        self.nodes.values().find(|n| n.name == name)
    }

    /// Resolve a node reference that may be a Gorn address (digit string,
    /// empty = root) or a node name.
    pub fn resolve(&self, reference: &str) -> MgResult<Address> {
        if let Ok(address) = Address::new(reference) {
            return Ok(address);
        }
        self.by_name(reference)
            .map(|n| n.address.clone())
            .ok_or_else(|| MgError::UnknownName(reference.to_string()))
    }

    /// All addresses in sorted (structural) order.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.nodes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GornNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes that participate in movement.
    pub fn movers(&self) -> impl Iterator<Item = &GornNode> {
        self.nodes.values().filter(|n| !n.movement.is_empty())
    }

    /// Record that `source` moves to `target` under `feature`. Both ends may
    /// be given as addresses or node names and must exist in the tree.
    pub fn add_mover(&mut self, source: &str, target: &str, feature: &str) -> MgResult<()> {
        let source = self.resolve(source)?;
        let target = self.resolve(target)?;
        self.node(&target)?;
        let node = self
            .get_mut(&source)
            .ok_or_else(|| MgError::UnknownAddress(source.to_string()))?;
        node.record_move(target, feature);
        Ok(())
    }

    //////////////////////////
    //  Structural Queries  //
    //////////////////////////

    /// Bottom-up list of all properly dominating addresses, mother first.
    /// Ancestors are not checked for existence; mother-closure guarantees
    /// them in a well-formed tree.
    pub fn ancestors(&self, address: &Address) -> MgResult<Vec<Address>> {
        self.node(address)?;
        Ok(address.ancestors())
    }

    /// Addresses of all reflexively dominated nodes.
    pub fn subtree(&self, address: &Address) -> Vec<Address> {
        self.nodes
            .keys()
            .filter(|a| address.dominates(a))
            .cloned()
            .collect()
    }

    /// Addresses of all properly dominated nodes.
    pub fn pdom(&self, address: &Address) -> Vec<Address> {
        self.nodes
            .keys()
            .filter(|a| address.properly_dominates(a))
            .cloned()
            .collect()
    }

    /// Addresses of all immediately dominated nodes, left to right.
    pub fn daughters(&self, address: &Address) -> Vec<Address> {
        self.nodes
            .keys()
            .filter(|a| a.depth() == address.depth() + 1 && address.dominates(a))
            .cloned()
            .collect()
    }

    /// Addresses of all reflexively dominated leaf nodes.
    pub fn leaves(&self, address: &Address) -> Vec<Address> {
        if self.is_leaf(address) {
            vec![address.clone()]
        } else {
            self.pdom(address)
                .into_iter()
                .filter(|a| self.is_leaf(a))
                .collect()
        }
    }

    pub fn left_siblings(&self, address: &Address) -> Vec<Address> {
        match address.mother() {
            None => Vec::new(),
            Some(mother) => self
                .daughters(&mother)
                .into_iter()
                .filter(|a| a.last_branch() < address.last_branch())
                .collect(),
        }
    }

    pub fn right_siblings(&self, address: &Address) -> Vec<Address> {
        match address.mother() {
            None => Vec::new(),
            Some(mother) => self
                .daughters(&mother)
                .into_iter()
                .filter(|a| a.last_branch() > address.last_branch())
                .collect(),
        }
    }

    pub fn mother(&self, address: &Address) -> Option<Address> {
        address.mother()
    }

    //////////////////////////
    //  Node Geometry Tests //
    //////////////////////////

    pub fn has_daughters(&self, address: &Address) -> bool {
        !self.daughters(address).is_empty()
    }

    pub fn is_leaf(&self, address: &Address) -> bool {
        !self.has_daughters(address)
    }

    pub fn has_siblings(&self, address: &Address) -> bool {
        !self.left_siblings(address).is_empty() || !self.right_siblings(address).is_empty()
    }

    ////////////////////////
    //  Surface Precedence //
    ////////////////////////

    /// Surface order of the leaves; may differ from structural order.
    pub fn linear(&self) -> &[Address] {
        &self.linear
    }

    pub fn set_linear(&mut self, order: Vec<Address>) {
        self.linear = order;
    }

    /// Does the material of `a` surface strictly before the material of `b`?
    ///
    /// Determined by the linear leaf order, not tree shape: a structurally
    /// right sibling precedes its left sibling if movement linearizes one of
    /// its leaves before all of the left sibling's leaves. Nodes related by
    /// dominance never precede one another.
    ///
    /// Fails when neither node dominates any surface leaf, which indicates a
    /// malformed tree; no precedence value is guessed.
    pub fn precedes(&self, a: &Address, b: &Address) -> MgResult<bool> {
        if a == b || a.dominates(b) || b.dominates(a) {
            return Ok(false);
        }
        for leaf in &self.linear {
            if a.dominates(leaf) {
                return Ok(true);
            }
            if b.dominates(leaf) {
                return Ok(false);
            }
        }
        Err(MgError::AmbiguousPrecedence(a.to_string(), b.to_string()))
    }

    /// All addresses the node at `address` surface-precedes.
    pub fn precede_list(&self, address: &Address) -> MgResult<Vec<Address>> {
        let mut followers = Vec::new();
        for other in self.nodes.keys() {
            if self.precedes(address, other)? {
                followers.push(other.clone());
            }
        }
        Ok(followers)
    }

    /////////////////////
    //  Safety Checks  //
    /////////////////////

    /// Every non-root address has its mother in the domain.
    pub fn is_mother_closed(&self) -> bool {
        self.nodes.keys().all(|a| match a.mother() {
            None => true,
            Some(mother) => self.nodes.contains_key(&mother),
        })
    }

    /// Every address ending in branch k has all siblings 1..k in the domain.
    pub fn is_left_sibling_closed(&self) -> bool {
        self.nodes.keys().all(|a| {
            let Some(branch) = a.last_branch() else {
                return true;
            };
            let mother = a.mother().expect("non-root address has a mother");
            (1..branch).all(|b| {
                let sibling = mother.daughter(b).expect("branch below an admissible one");
                self.nodes.contains_key(&sibling)
            })
        })
    }

    /// Run all consistency checks, reporting every violated closure.
    pub fn check_consistency(&self) -> MgResult<()> {
        let mut reasons = Vec::new();
        if !self.is_mother_closed() {
            reasons.push("mother closure not satisfied");
        }
        if !self.is_left_sibling_closed() {
            reasons.push("left sibling closure not satisfied");
        }
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(MgError::StructuralInconsistency {
                tree: self.name.clone(),
                reason: reasons.join("; "),
            })
        }
    }

    ////////////////////////////
    //  Annotation Bookkeeping //
    ////////////////////////////

    pub fn is_annotated(&self) -> bool {
        self.annotated
    }

    pub(crate) fn mark_annotated(&mut self) {
        self.annotated = true;
    }

    /// Classify every node's leaf/empty status from the tree shape: interior
    /// nodes are neither leaves nor empty, daughterless nodes are leaves
    /// (their `empty` flag stays as specified).
    pub(crate) fn classify_status(&mut self) {
        let interior: Vec<Address> = self
            .nodes
            .keys()
            .filter(|a| self.has_daughters(a))
            .cloned()
            .collect();
        for (address, node) in self.nodes.iter_mut() {
            if interior.contains(address) {
                node.leaf = Some(false);
                node.empty = Some(false);
            } else {
                node.leaf = Some(true);
            }
        }
    }

    ///////////////////////
    //  Metric Profile   //
    ///////////////////////

    /// Look up a memoized metric value by metric name.
    pub fn cached_metric(&self, metric_name: &str) -> Option<RankedValue> {
        self.profile.borrow().get(metric_name).cloned()
    }

    /// Memoize a metric value. First write wins; trees never recompute.
    pub fn memoize_metric(&self, metric_name: &str, value: RankedValue) {
        self.profile
            .borrow_mut()
            .entry(metric_name.to_string())
            .or_insert(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // S
    // ├── NP
    // │   ├── the
    // │   └── man
    // └── VP
    //     ├── gave
    //     ├── NP ── Bill
    //     └── NP
    //         ├── a
    //         └── book
    fn sample_tree() -> GornTree {
        let spec: &[(&str, &str)] = &[
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
        ];
        let mut tree = GornTree::new("ditransitive");
        for (address, label) in spec {
            tree.add(GornNode::new(Address::new(*address).unwrap(), *label))
                .unwrap();
        }
        // scrambled surface order: the two object NPs front
        tree.set_linear(
            ["231", "232", "11", "12", "21", "221"]
                .iter()
                .map(|a| Address::new(*a).unwrap())
                .collect(),
        );
        tree
    }

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[test]
    fn daughters_are_sorted_and_immediate() {
        let tree = sample_tree();
        let daughters = tree.daughters(&addr("2"));
        assert_eq!(daughters, vec![addr("21"), addr("22"), addr("23")]);
        assert!(tree.daughters(&addr("11")).is_empty());
    }

    #[test]
    fn leaves_are_reflexive_on_leaf_nodes() {
        let tree = sample_tree();
        assert_eq!(tree.leaves(&addr("11")), vec![addr("11")]);
        assert_eq!(
            tree.leaves(&addr("2")),
            vec![addr("21"), addr("221"), addr("231"), addr("232")]
        );
    }

    #[test]
    fn siblings_split_by_branch_number() {
        let tree = sample_tree();
        assert_eq!(tree.left_siblings(&addr("22")), vec![addr("21")]);
        assert_eq!(tree.right_siblings(&addr("22")), vec![addr("23")]);
        assert!(tree.left_siblings(&Address::root()).is_empty());
    }

    #[test]
    fn surface_precedence_follows_linear_not_structure() {
        let tree = sample_tree();
        // NP "a book" (23) is structurally rightmost but surfaces first
        assert!(tree.precedes(&addr("23"), &addr("1")).unwrap());
        assert!(!tree.precedes(&addr("1"), &addr("23")).unwrap());
        // dominance-related nodes never precede each other
        assert!(!tree.precedes(&addr("2"), &addr("21")).unwrap());
        assert!(!tree.precedes(&addr("2"), &addr("2")).unwrap());
    }

    #[test]
    fn precedence_without_surface_material_is_an_error() {
        let mut tree = sample_tree();
        tree.set_linear(vec![addr("231")]);
        // neither the subject NP nor the verb dominates the only surface leaf
        let result = tree.precedes(&addr("1"), &addr("21"));
        assert!(matches!(result, Err(MgError::AmbiguousPrecedence(_, _))));
    }

    #[test]
    fn closure_checks_catch_gaps() {
        let mut tree = sample_tree();
        assert!(tree.check_consistency().is_ok());

        tree.remove(&addr("22"));
        // 221 lost its mother, and 23 its left sibling
        assert!(!tree.is_mother_closed());
        assert!(!tree.is_left_sibling_closed());
        let err = tree.check_consistency().unwrap_err();
        assert!(err.to_string().contains("mother closure"));
        assert!(err.to_string().contains("left sibling closure"));
    }

    #[test]
    fn removing_an_only_daughter_promotes_the_mother_in_linear() {
        let mut tree = sample_tree();
        tree.remove(&addr("221"));
        assert!(tree.linear().contains(&addr("22")));
        assert!(!tree.linear().contains(&addr("221")));

        // removing a leaf with siblings just drops it
        let before = tree.linear().len();
        tree.remove(&addr("11"));
        assert_eq!(tree.linear().len(), before - 1);
        assert!(!tree.linear().contains(&addr("1")));
    }

    #[test]
    fn classification_marks_interior_and_leaf_nodes() {
        let mut tree = sample_tree();
        tree.classify_status();
        assert_eq!(tree.get(&addr("2")).unwrap().leaf, Some(false));
        assert_eq!(tree.get(&addr("2")).unwrap().empty, Some(false));
        assert_eq!(tree.get(&addr("232")).unwrap().leaf, Some(true));
        assert_eq!(tree.get(&addr("232")).unwrap().empty, None);
    }

    #[test]
    fn resolve_accepts_addresses_names_and_root() {
        let tree = sample_tree();
        assert_eq!(tree.resolve("221").unwrap(), addr("221"));
        assert_eq!(tree.resolve("t221").unwrap(), addr("221"));
        assert_eq!(tree.resolve("").unwrap(), Address::root());
        assert!(tree.resolve("no-such-node").is_err());
    }
}
