//! Tests for the public tree query surface

use mgload::address::Address;
use mgload::builder::{NodeSpec, TreeBuilder};
use mgload::errors::MgError;
use mgload::tree::GornTree;

fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

fn scrambled() -> GornTree {
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
    TreeBuilder::new("scrambled")
        .nodes(specs)
        .leaf_order(["231", "232", "11", "12", "21", "221"])
        .build()
        .unwrap()
}

#[test]
fn given_a_node_when_asking_for_ancestors_then_they_come_bottom_up() {
    let tree = scrambled();
    let up: Vec<String> = tree
        .ancestors(&addr("221"))
        .unwrap()
        .iter()
        .map(|a| a.to_string())
        .collect();
    assert_eq!(up, ["22", "2", ""]);
}

#[test]
fn given_an_unknown_address_when_asking_for_ancestors_then_it_errors() {
    let tree = scrambled();
    assert!(matches!(
        tree.ancestors(&addr("99")),
        Err(MgError::UnknownAddress(_))
    ));
}

#[test]
fn given_a_subtree_query_then_reflexive_and_proper_dominance_differ() {
    let tree = scrambled();
    let reflexive = tree.subtree(&addr("22"));
    let proper = tree.pdom(&addr("22"));
    assert_eq!(reflexive, vec![addr("22"), addr("221")]);
    assert_eq!(proper, vec![addr("221")]);
}

#[test]
fn given_the_scrambled_order_then_precede_list_reflects_the_surface() {
    let tree = scrambled();
    // the fronted NP (23) surface-precedes everything outside its subtree
    let followers = tree.precede_list(&addr("23")).unwrap();
    assert!(followers.contains(&addr("1")));
    assert!(followers.contains(&addr("21")));
    assert!(followers.contains(&addr("22")));
    assert!(!followers.contains(&addr("231")));

    // while the subject NP only precedes the verb-side material
    let followers = tree.precede_list(&addr("1")).unwrap();
    assert!(followers.contains(&addr("21")));
    assert!(!followers.contains(&addr("23")));
}

#[test]
fn given_node_names_then_lookup_works_alongside_addresses() {
    let tree = scrambled();
    assert_eq!(tree.by_name("t221").unwrap().label, "Bill");
    assert!(tree.by_name("nobody").is_none());
    assert_eq!(tree.resolve("t221").unwrap(), addr("221"));
}

#[test]
fn given_a_removed_node_when_removing_again_then_nothing_happens() {
    let mut tree = scrambled();
    let before = tree.len();
    tree.remove(&addr("221"));
    tree.remove(&addr("221"));
    assert_eq!(tree.len(), before - 1);
}

#[test]
fn given_movement_annotations_then_movers_are_enumerable() {
    let mut tree = scrambled();
    assert_eq!(tree.movers().count(), 0);
    tree.add_mover("23", "", "top").unwrap();
    tree.add_mover("1", "", "nom").unwrap();
    assert_eq!(tree.movers().count(), 2);
    assert!(tree.add_mover("23", "77", "oops").is_err());
}
