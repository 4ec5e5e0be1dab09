//! Tests for tenure/movement extraction and memory_measure

use rstest::rstest;

use mgload::address::Address;
use mgload::builder::{NodeSpec, TreeBuilder};
use mgload::registry::ReducerRegistry;
use mgload::tree::GornTree;
use mgload::values::{memory_measure, move_extract, tenure_extract, LoadType, MetricValue};

const NO_FILTERS: &[&str] = &[];

fn ditransitive(name: &str, leaf_order: &[&str]) -> GornTree {
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
    TreeBuilder::new(name)
        .nodes(specs)
        .leaf_order(leaf_order.iter().copied())
        .build()
        .unwrap()
}

fn scrambled() -> GornTree {
    ditransitive("scrambled", &["231", "232", "11", "12", "21", "221"])
}

fn canonical() -> GornTree {
    ditransitive("canonical", &["11", "12", "21", "221", "231", "232"])
}

#[test]
fn given_default_mode_when_extracting_tenure_then_only_values_above_two_remain() {
    let tree = scrambled();
    let tenures = tenure_extract(&tree, NO_FILTERS, false);

    let flat: Vec<(String, u32)> = tenures
        .iter()
        .map(|(a, t)| (a.to_string(), *t))
        .collect();
    assert_eq!(
        flat,
        vec![
            ("1".to_string(), 5),
            ("21".to_string(), 7),
            ("22".to_string(), 8),
        ]
    );
}

#[test]
fn given_trivial_mode_when_extracting_tenure_then_every_node_appears() {
    let tree = scrambled();
    let tenures = tenure_extract(&tree, NO_FILTERS, true);

    // every node has tenure >= 1 after annotation
    assert_eq!(tenures.len(), tree.len());
    assert!(tenures.values().all(|&t| t > 0));
    assert_eq!(tenures[&Address::new("12").unwrap()], 2);
}

#[test]
fn given_type_filters_when_extracting_tenure_then_matching_nodes_drop_out() {
    let tree = scrambled();

    // interior nodes filtered: only the high-tenure leaf survives
    let leaf_only = tenure_extract(&tree, &["I"], false);
    assert_eq!(leaf_only.len(), 1);
    assert_eq!(leaf_only[&Address::new("21").unwrap()], 7);

    // pronounced leaves filtered: the interior load remains
    let interior_only = tenure_extract(&tree, &["P"], false);
    assert_eq!(interior_only.len(), 2);

    // unknown filter tokens never match anything
    let unfiltered = tenure_extract(&tree, &["X", "Q"], false);
    assert_eq!(unfiltered.len(), 3);

    // filtering both sides empties the extraction
    assert!(tenure_extract(&tree, &["I", "P", "U"], false).is_empty());
}

#[test]
fn given_a_movement_chain_when_extracting_then_only_the_final_step_counts() {
    let mut tree = scrambled();
    tree.add_mover("23", "2", "scr").unwrap();
    tree.add_mover("23", "", "top").unwrap();

    // index(23) = 3, index(root) = 1
    let final_only = move_extract(&tree, NO_FILTERS, false).unwrap();
    assert_eq!(final_only.len(), 1);
    let (step, distance) = final_only.iter().next().unwrap();
    assert_eq!(step.source, Address::new("23").unwrap());
    assert_eq!(step.target, Address::root());
    assert_eq!(step.feature, "top");
    assert_eq!(*distance, 2);

    // trivial mode adds the intermediate landing site: index(2) = 2
    let all_steps = move_extract(&tree, NO_FILTERS, true).unwrap();
    assert_eq!(all_steps.len(), 2);
    assert!(all_steps.values().any(|&d| d == 1));
}

#[test]
fn given_feature_filters_when_extracting_movement_then_those_steps_drop_out() {
    let mut tree = scrambled();
    tree.add_mover("23", "2", "scr").unwrap();
    tree.add_mover("23", "", "top").unwrap();
    tree.add_mover("1", "", "nom").unwrap();

    let without_top = move_extract(&tree, &["top"], true).unwrap();
    assert!(without_top.keys().all(|step| step.feature != "top"));
    assert_eq!(without_top.len(), 2);

    assert!(move_extract(&tree, &["top", "scr", "nom"], true)
        .unwrap()
        .is_empty());
}

#[rstest]
#[case("max", MetricValue::Int(8))]
#[case("sum", MetricValue::Int(20))]
#[case("count", MetricValue::Int(3))]
#[case("sorted", MetricValue::Vector(vec![8, 7, 5]))]
fn given_the_scrambled_tree_when_measuring_tenure_then_operators_agree(
    #[case] operator: &str,
    #[case] expected: MetricValue,
) {
    let registry = ReducerRegistry::with_defaults();
    let tree = scrambled();
    let value = memory_measure(
        &tree,
        registry.resolve(operator).unwrap(),
        LoadType::Tenure,
        NO_FILTERS,
        false,
    )
    .unwrap();
    assert_eq!(value, expected);
}

#[test]
fn given_both_orders_when_measuring_then_the_canonical_tree_is_cheaper() {
    let registry = ReducerRegistry::with_defaults();
    let max = registry.resolve("max").unwrap();

    let canonical_max =
        memory_measure(&canonical(), max, LoadType::Tenure, NO_FILTERS, false).unwrap();
    let scrambled_max =
        memory_measure(&scrambled(), max, LoadType::Tenure, NO_FILTERS, false).unwrap();

    assert_eq!(canonical_max, MetricValue::Int(4));
    assert_eq!(scrambled_max, MetricValue::Int(8));
    assert!(canonical_max < scrambled_max);
}

#[test]
fn given_no_movement_when_measuring_size_then_reducers_stay_neutral() {
    let registry = ReducerRegistry::with_defaults();
    let tree = canonical();

    let max = memory_measure(
        &tree,
        registry.resolve("max").unwrap(),
        LoadType::Size,
        NO_FILTERS,
        false,
    )
    .unwrap();
    assert_eq!(max, MetricValue::Int(0));

    let avg = memory_measure(
        &tree,
        registry.resolve("avg").unwrap(),
        LoadType::Size,
        NO_FILTERS,
        false,
    )
    .unwrap();
    assert_eq!(avg, MetricValue::Float(0.0));
}

#[test]
fn given_trivial_mode_when_summing_then_all_tenures_add_up() {
    let registry = ReducerRegistry::with_defaults();
    let sum = registry.resolve("sum").unwrap();

    let total =
        memory_measure(&scrambled(), sum, LoadType::Tenure, NO_FILTERS, true).unwrap();
    assert_eq!(total, MetricValue::Int(30));

    let canonical_total =
        memory_measure(&canonical(), sum, LoadType::Tenure, NO_FILTERS, true).unwrap();
    assert_eq!(canonical_total, MetricValue::Int(20));
}
