//! Index/outdex annotation.
//!
//! The traversal combines top-down and bottom-up movement: walk from the
//! root toward the linearly first leaf handing out indices and outdices,
//! then for each further leaf climb until a node that already carries an
//! index and percolate outdices back down along the path to the leaf. The
//! resulting intervals nest along the hierarchy while growing in surface
//! order, which is what makes tenure sensitive to displacement.

use tracing::instrument;

use crate::address::Address;
use crate::errors::{MgError, MgResult};
use crate::tree::GornTree;

/// Annotate every node of `tree` with an index/outdex pair and classify
/// leaf/empty status.
///
/// Requires a consistent tree with a non-empty linear leaf order. Runs at
/// most once per tree: indices are assigned under the assumption that none
/// exist yet, so a second invocation is rejected instead of silently
/// producing garbage.
#[instrument(level = "debug", skip(tree), fields(tree = %tree.name))]
pub fn annotate(tree: &mut GornTree) -> MgResult<()> {
    if tree.is_annotated() {
        return Err(MgError::AlreadyAnnotated(tree.name.clone()));
    }
    tree.check_consistency()?;
    if tree.linear().is_empty() {
        return Err(MgError::MissingLinearOrder(tree.name.clone()));
    }

    let root = Address::root();
    tree.node(&root)?;
    set_index(tree, &root, 1);
    let mut current_outdex = 1u32;

    for leaf in tree.linear().to_vec() {
        tree.node(&leaf)?;
        let ancestors = leaf.ancestors();

        // degenerate single-node tree: the root is the only leaf
        if ancestors.is_empty() {
            current_outdex += 1;
            set_outdex(tree, &leaf, current_outdex);
            continue;
        }

        // climb to the lowest ancestor that already carries an index
        let anchor = ancestors
            .iter()
            .position(|a| tree.node(a).map(|n| n.index.is_some()).unwrap_or(false))
            .ok_or_else(|| MgError::StructuralInconsistency {
                tree: tree.name.clone(),
                reason: format!("no indexed ancestor above leaf {}", leaf),
            })?;

        if tree.node(&ancestors[anchor])?.outdex.is_none() {
            current_outdex += 1;
            set_outdex(tree, &ancestors[anchor], current_outdex);
        }

        // percolate indices/outdices down from the anchor toward the leaf
        for pos in (0..anchor).rev() {
            let inherited = tree.node(&ancestors[pos + 1])?.outdex;
            let current = &ancestors[pos];
            if let Some(index) = inherited {
                set_index(tree, current, index);
            }
            current_outdex += 1;
            set_outdex(tree, current, current_outdex);
        }

        // and finally the leaf itself
        if let Some(index) = tree.node(&ancestors[0])?.outdex {
            set_index(tree, &leaf, index);
        }
        current_outdex += 1;
        set_outdex(tree, &leaf, current_outdex);
    }

    tree.classify_status();
    tree.mark_annotated();
    Ok(())
}

fn set_index(tree: &mut GornTree, address: &Address, index: u32) {
    if let Some(node) = tree.get_mut(address) {
        node.index = Some(index);
    }
}

fn set_outdex(tree: &mut GornTree, address: &Address, outdex: u32) {
    if let Some(node) = tree.get_mut(address) {
        node.outdex = Some(outdex);
    }
}
