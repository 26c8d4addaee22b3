//! Loading a complete economy (unlock tree plus prestige layers) from a
//! data directory.
//!
//! # Layout
//!
//! - `unlocks.{ron,toml,json}` (required): list of [`UnlockNodeData`]; the
//!   TOML form uses `[[unlocks]]` tables.
//! - `prestige.{ron,toml,json}` (optional): list of [`PrestigeLayerData`];
//!   the TOML form uses `[[layers]]` tables.
//!
//! Requirements are wired after every node is added, so nodes may reference
//! ids defined later in the same file.

use ascension_core::ScaledNumber;
use ascension_prestige::{PrestigeConfig, PrestigeEngine};
use ascension_unlocks::{UnlockGraph, UnlockGraphError, UnlockNode};
use std::path::Path;
use tracing::{debug, warn};

use crate::loader::{DataLoadError, deserialize_list, find_data_file, require_data_file};
use crate::schema::{PrestigeLayerData, UnlockNodeData};

/// Everything loaded from an economy data directory.
#[derive(Debug)]
pub struct EconomyData {
    pub unlocks: UnlockGraph,
    pub prestige_layers: Vec<PrestigeEngine>,
}

/// Load an economy from `dir`.
pub fn load_economy(dir: &Path) -> Result<EconomyData, DataLoadError> {
    let unlocks_path = require_data_file(dir, "unlocks")?;
    let unlocks = load_unlock_graph(&unlocks_path)?;

    let prestige_layers = match find_data_file(dir, "prestige")? {
        Some(path) => load_prestige_layers(&path)?,
        None => Vec::new(),
    };

    debug!(
        dir = %dir.display(),
        nodes = unlocks.node_count(),
        layers = prestige_layers.len(),
        "economy loaded"
    );
    Ok(EconomyData {
        unlocks,
        prestige_layers,
    })
}

/// Load an unlock graph from a single data file.
pub fn load_unlock_graph(path: &Path) -> Result<UnlockGraph, DataLoadError> {
    let data: Vec<UnlockNodeData> = deserialize_list(path, "unlocks")?;
    build_unlock_graph(&data, path)
}

/// Build an unlock graph from parsed node definitions. `file` is used for
/// error reporting only.
pub fn build_unlock_graph(
    data: &[UnlockNodeData],
    file: &Path,
) -> Result<UnlockGraph, DataLoadError> {
    let mut graph = UnlockGraph::new();

    for entry in data {
        let cost = entry.cost.resolve(file)?;
        if cost.is_negative() {
            warn!(node = %entry.id, cost = %cost, file = %file.display(), "negative unlock cost");
        }

        let mut node = UnlockNode::new(&entry.id, &entry.name, cost).with_tier(entry.tier);
        node.description = entry.description.clone();
        node.icon = entry.icon.clone();

        graph
            .validate_node(&node)
            .map_err(|e| graph_error(e, file))?;
        graph.add_node(node);
    }

    for entry in data {
        for required in &entry.requires {
            graph
                .validate_requirement(&entry.id, required)
                .map_err(|e| graph_error(e, file))?;
            graph.add_requirement(&entry.id, required);
        }
    }

    Ok(graph)
}

/// Load prestige layers from a single data file.
pub fn load_prestige_layers(path: &Path) -> Result<Vec<PrestigeEngine>, DataLoadError> {
    let data: Vec<PrestigeLayerData> = deserialize_list(path, "layers")?;

    data.iter()
        .map(|layer| {
            let config = resolve_prestige_config(layer, path)?;
            Ok(PrestigeEngine::from_config(config))
        })
        .collect()
}

/// Resolve a `PrestigeLayerData` into a `PrestigeConfig`, filling omitted
/// fields from the defaults.
fn resolve_prestige_config(
    data: &PrestigeLayerData,
    file: &Path,
) -> Result<PrestigeConfig, DataLoadError> {
    let defaults = PrestigeConfig::default();
    let threshold = match &data.threshold {
        Some(n) => n.resolve(file)?,
        None => defaults.threshold,
    };
    if !threshold.greater_than(&ScaledNumber::ZERO) {
        warn!(
            layer = data.id.as_deref().unwrap_or("-"),
            threshold = %threshold,
            file = %file.display(),
            "non-positive prestige threshold; every value will qualify"
        );
    }

    Ok(PrestigeConfig {
        id: data.id.clone(),
        name: data.name.clone(),
        threshold,
        scaling_exponent: data.scaling_exponent.unwrap_or(defaults.scaling_exponent),
    })
}

fn graph_error(err: UnlockGraphError, file: &Path) -> DataLoadError {
    match err {
        UnlockGraphError::NodeNotFound(name) => DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name,
            expected_kind: "unlock node",
        },
        UnlockGraphError::DuplicateId(name) => DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name,
        },
        UnlockGraphError::WouldCreateCycle { node, required } => DataLoadError::Cycle {
            file: file.to_path_buf(),
            node,
            required,
        },
        err @ UnlockGraphError::KeyMismatch { .. } => DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: err.to_string(),
        },
    }
}

// ===========================================================================
// Tests
// ===========================================================================
