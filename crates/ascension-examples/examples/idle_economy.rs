//! Idle economy example: production, purchases, and prestige.
//!
//! Builds a small unlock tree and a prestige layer in code, then simulates
//! several runs of an idle game with a manual clock. Each run buys whatever
//! it can afford, prestiges once the threshold is cleared, and starts over
//! with a larger bonus multiplier.
//!
//! Run with: `RUST_LOG=debug cargo run -p ascension-examples --example idle_economy`

use std::cell::Cell;
use std::rc::Rc;

use ascension_core::ScaledNumber;
use ascension_core::clock::{Clock, ManualClock};
use ascension_core::format::Notation;
use ascension_prestige::{PrestigeEngine, PrestigeEvent};
use ascension_unlocks::{UnlockEvent, UnlockGraph, UnlockNode};
use tracing::info;

/// Seconds simulated per loop step.
const STEP: i64 = 60;

/// Production multiplier granted by each upgrade.
const UPGRADES: &[(&str, &str, f64, f64)] = &[
    ("cursor", "Cursor", 15.0, 2.0),
    ("grandma", "Grandma", 100.0, 3.0),
    ("farm", "Farm", 1_100.0, 4.0),
    ("mine", "Mine", 12_000.0, 6.0),
    ("factory", "Factory", 130_000.0, 10.0),
];

fn build_tree() -> UnlockGraph {
    let mut tree = UnlockGraph::new();
    for (tier, (id, name, cost, _)) in UPGRADES.iter().enumerate() {
        tree.add_node(
            UnlockNode::new(*id, *name, ScaledNumber::from_f64(*cost)).with_tier(tier as i32),
        );
    }
    // A linear chain: each upgrade requires the previous one.
    for pair in UPGRADES.windows(2) {
        tree.add_requirement(pair[1].0, pair[0].0);
    }
    // Rejected: would close a cycle.
    assert!(!tree.add_requirement("cursor", "factory"));
    tree
}

fn production_rate(tree: &UnlockGraph, prestige: &PrestigeEngine) -> ScaledNumber {
    let mut rate = ScaledNumber::ONE;
    for (id, _, _, factor) in UPGRADES {
        if tree.get_node(id).is_some_and(|n| n.is_unlocked()) {
            rate *= *factor;
        }
    }
    rate * prestige.bonus_multiplier()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let clock = ManualClock::new(1_700_000_000);
    let mut tree = build_tree();
    let mut prestige = PrestigeEngine::new()
        .with_id("ascension")
        .with_threshold(ScaledNumber::from_f64(1e7))
        .with_scaling_exponent(0.5);

    let purchases = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&purchases);
    tree.subscribe(Box::new(move |event| {
        if let UnlockEvent::NodeUnlocked { .. } = event {
            counter.set(counter.get() + 1);
        }
    }));
    prestige.subscribe(Box::new(|event| {
        let PrestigeEvent::Performed {
            reward,
            times_performed,
            ..
        } = event;
        info!(times = times_performed, reward = %reward, "ascended");
    }));

    println!("Unlock order: {:?}\n", tree.topological_order());

    let mut points = ScaledNumber::ZERO;
    for run in 1..=4 {
        let started = clock.now();
        while !prestige.can_prestige(&points) {
            clock.advance(STEP);
            points += production_rate(&tree, &prestige).multiply_scalar(STEP as f64);

            // Buy everything affordable, cheapest tier first.
            let available: Vec<String> = tree
                .get_available(&points)
                .into_iter()
                .map(|n| n.id.clone())
                .collect();
            for id in available {
                if let Some(cost) = tree.purchase(&id, &points, clock.now()) {
                    points -= cost;
                }
            }
        }

        println!(
            "Run {run}: {} points after {} s, {:.0}% of the tree unlocked",
            points,
            clock.now() - started,
            tree.get_progress() * 100.0
        );
        let reward = prestige.perform(&points, clock.now());
        println!(
            "  reward {} (total {}, multiplier x{:.2})",
            reward.format(Notation::Scientific),
            prestige.accumulated_points(),
            prestige.bonus_multiplier()
        );

        points = ScaledNumber::ZERO;
        tree.reset();
    }

    println!("\nUpgrades purchased across all runs: {}", purchases.get());
    println!(
        "Events queued: {} unlock, {} prestige",
        tree.drain_events().len(),
        prestige.drain_events().len()
    );
}
