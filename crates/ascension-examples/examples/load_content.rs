//! Content loading example: an economy defined in data files.
//!
//! Loads `data/unlocks.ron` and `data/prestige.toml`, prints the tree tier
//! by tier in every notation, and shows which layers a given run total
//! qualifies for.
//!
//! Run with: `cargo run -p ascension-examples --example load_content`

use std::path::Path;

use ascension_core::ScaledNumber;
use ascension_core::format::Notation;
use ascension_data::load_economy;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let economy = match load_economy(&dir) {
        Ok(economy) => economy,
        Err(e) => {
            tracing::error!(error = %e, "failed to load economy");
            std::process::exit(1);
        }
    };

    let tree = &economy.unlocks;
    println!("Loaded {} unlocks:", tree.node_count());
    for id in tree.topological_order() {
        let Some(node) = tree.get_node(id) else {
            continue;
        };
        println!(
            "  [tier {}] {:<14} {:>10} | {:>10} | {:>10}  requires {:?}",
            node.tier,
            node.name,
            node.cost.format(Notation::Short),
            node.cost.format(Notation::Scientific),
            node.cost.format(Notation::Engineering),
            tree.requirements(id),
        );
    }

    let run_total: ScaledNumber = "4.2e75".parse().unwrap_or_default();
    println!("\nRun total {run_total}:");
    for layer in &economy.prestige_layers {
        println!(
            "  {:<14} threshold {:>8}  {}",
            layer.name().or(layer.id()).unwrap_or("?"),
            layer.threshold(),
            if layer.can_prestige(&run_total) {
                format!("reward {}", layer.calculate_reward(&run_total))
            } else {
                "not yet".to_string()
            }
        );
    }
}
