//! Property-based tests for the unlock graph.
//!
//! Generates random edge-insertion sequences over a fixed node set and
//! verifies the graph never becomes cyclic and that rejected insertions
//! leave the graph untouched.

use ascension_core::ScaledNumber;
use ascension_unlocks::{UnlockGraph, UnlockNode};
use proptest::prelude::*;

const NODE_COUNT: usize = 12;

fn node_id(i: usize) -> String {
    format!("n{i:02}")
}

fn build_nodes() -> UnlockGraph {
    let mut graph = UnlockGraph::new();
    for i in 0..NODE_COUNT {
        let cost = ScaledNumber::from_f64(10.0 * (i + 1) as f64);
        graph.add_node(UnlockNode::new(node_id(i), format!("Node {i}"), cost));
    }
    graph
}

fn arb_edges(max_edges: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    proptest::collection::vec((0..NODE_COUNT, 0..NODE_COUNT), 1..=max_edges)
}

fn requirement_snapshot(graph: &UnlockGraph) -> Vec<Vec<String>> {
    (0..NODE_COUNT)
        .map(|i| graph.requirements(&node_id(i)).to_vec())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// After any insertion sequence, a topological order covers every node.
    #[test]
    fn graph_stays_acyclic(edges in arb_edges(60)) {
        let mut graph = build_nodes();
        for (a, b) in edges {
            graph.add_requirement(&node_id(a), &node_id(b));
        }
        prop_assert_eq!(graph.topological_order().len(), NODE_COUNT);
    }

    /// A rejected insertion changes nothing; an accepted one adds at most one edge.
    #[test]
    fn rejected_insertions_are_atomic(edges in arb_edges(60)) {
        let mut graph = build_nodes();
        for (a, b) in edges {
            let (a, b) = (node_id(a), node_id(b));
            let before = requirement_snapshot(&graph);
            let predicted_cycle = graph.would_create_cycle(&a, &b);
            let accepted = graph.add_requirement(&a, &b);
            prop_assert_eq!(accepted, !predicted_cycle);
            if !accepted {
                prop_assert_eq!(requirement_snapshot(&graph), before);
            } else {
                prop_assert!(graph.requirements(&a).iter().any(|r| *r == b));
            }
        }
    }

    /// Unlocking in topological order with enough points always succeeds.
    #[test]
    fn topological_order_is_unlockable(edges in arb_edges(40)) {
        let mut graph = build_nodes();
        for (a, b) in edges {
            graph.add_requirement(&node_id(a), &node_id(b));
        }
        let order: Vec<String> = graph
            .topological_order()
            .into_iter()
            .map(str::to_string)
            .collect();
        let budget = ScaledNumber::from_f64(1e6);
        for id in &order {
            prop_assert!(graph.can_unlock(id, &budget), "{} not unlockable", id);
            prop_assert!(graph.unlock(id, 0));
        }
        prop_assert_eq!(graph.get_progress(), 1.0);
    }
}
