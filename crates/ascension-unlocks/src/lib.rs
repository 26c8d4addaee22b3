//! Unlock Graph module for the Ascension idle-economy toolkit.
//!
//! Provides a dependency graph of purchasable nodes, each with a
//! [`ScaledNumber`] cost and a set of prerequisite nodes. The requirements
//! relation is kept acyclic at all times.
//!
//! # Overview
//!
//! Nodes are added with [`UnlockGraph::add_node`] and wired together with
//! [`UnlockGraph::add_requirement`]. Any edge that would close a cycle
//! (including a self-loop) is rejected before the graph is touched, so the
//! graph is never observably cyclic.
//!
//! At runtime, game code asks [`UnlockGraph::can_unlock`] whether the player
//! can afford a node whose direct requirements are all unlocked, then calls
//! [`UnlockGraph::unlock`] and deducts the cost itself. [`UnlockGraph::purchase`]
//! combines both steps and returns the amount to deduct.
//!
//! # Removal
//!
//! [`UnlockGraph::remove_node`] drops a node and its own requirement list but
//! leaves other nodes' references to it in place. A requirement on a missing
//! node is never satisfied, so dependents of a removed node can no longer be
//! unlocked. Remove only leaf nodes, or rewire dependents first, when that is
//! not what you want.
//!
//! # Events
//!
//! Successful `unlock` and `lock` transitions emit [`UnlockEvent`]s to
//! subscribed listeners before returning, and queue them for
//! [`UnlockGraph::drain_events`].

use ascension_core::ScaledNumber;
use ascension_core::clock::Timestamp;
use ascension_core::event::{EventChannel, Listener};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Unlock node
// ---------------------------------------------------------------------------

/// A purchasable node in the unlock graph.
///
/// The unlock state is private: it changes only through
/// [`UnlockGraph::unlock`], [`UnlockGraph::lock`], and [`UnlockGraph::reset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockNode {
    /// Unique identifier within a graph.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Optional flavor text.
    #[serde(default)]
    pub description: Option<String>,

    /// Optional icon key, interpreted by the UI.
    #[serde(default)]
    pub icon: Option<String>,

    /// Points required to unlock. Deduction is the caller's job.
    pub cost: ScaledNumber,

    /// Display grouping.
    #[serde(default)]
    pub tier: i32,

    #[serde(default)]
    unlocked: bool,

    #[serde(default)]
    unlock_time: Option<Timestamp>,
}

impl UnlockNode {
    /// Create a locked node.
    pub fn new(id: impl Into<String>, name: impl Into<String>, cost: ScaledNumber) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            icon: None,
            cost,
            tier: 0,
            unlocked: false,
            unlock_time: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_tier(mut self, tier: i32) -> Self {
        self.tier = tier;
        self
    }

    /// Whether the node has been unlocked.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// When the node was unlocked, if it is.
    pub fn unlock_time(&self) -> Option<Timestamp> {
        self.unlock_time
    }

    fn clear_unlock(&mut self) {
        self.unlocked = false;
        self.unlock_time = None;
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events emitted by the unlock graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockEvent {
    /// A node transitioned from locked to unlocked.
    NodeUnlocked { id: String, time: Timestamp },

    /// A node transitioned from unlocked to locked.
    NodeLocked { id: String },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a graph edit would be rejected. The boolean edit methods discard
/// this; call the matching `validate_*` method to find out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnlockGraphError {
    #[error("unlock node not found: {0}")]
    NodeNotFound(String),

    #[error("duplicate unlock node id: {0}")]
    DuplicateId(String),

    #[error("requirement {required} for node {node} would create a cycle")]
    WouldCreateCycle { node: String, required: String },

    #[error("unlock node stored under key {key} has id {id}")]
    KeyMismatch { key: String, id: String },
}

// ---------------------------------------------------------------------------
// UnlockGraph
// ---------------------------------------------------------------------------

/// A directed acyclic graph of unlockable nodes.
///
/// Nodes are keyed by id in sorted order, so every query returns results
/// sorted by id. Requirement lists keep insertion order.
///
/// Deserialization rebuilds the graph through the same checks as
/// [`add_node`](Self::add_node) and [`add_requirement`](Self::add_requirement),
/// so a saved graph that is cyclic, keys a node under another id, or lists
/// requirements for a missing node fails to load.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "RawUnlockGraph")]
pub struct UnlockGraph {
    /// Nodes keyed by id.
    nodes: BTreeMap<String, UnlockNode>,

    /// node id -> ids it requires ("A requires B" is `A -> [B]`).
    requirements: BTreeMap<String, Vec<String>>,

    /// Listeners and pending events. Not serialized (transient).
    #[serde(skip)]
    events: EventChannel<UnlockEvent>,
}

/// On-disk shape of an [`UnlockGraph`], checked before use.
#[derive(Deserialize)]
struct RawUnlockGraph {
    #[serde(default)]
    nodes: BTreeMap<String, UnlockNode>,
    #[serde(default)]
    requirements: BTreeMap<String, Vec<String>>,
}

impl TryFrom<RawUnlockGraph> for UnlockGraph {
    type Error = UnlockGraphError;

    fn try_from(raw: RawUnlockGraph) -> Result<Self, Self::Error> {
        let mut graph = UnlockGraph::new();
        for (key, node) in raw.nodes {
            if key != node.id {
                return Err(UnlockGraphError::KeyMismatch { key, id: node.id });
            }
            graph.validate_node(&node)?;
            graph.add_node(node);
        }

        for (node, required) in raw.requirements {
            if !graph.contains(&node) {
                return Err(UnlockGraphError::NodeNotFound(node));
            }
            for req in required {
                if graph.contains(&req) {
                    graph.validate_requirement(&node, &req)?;
                    graph.add_requirement(&node, &req);
                } else {
                    // Left behind by remove_node; kept unsatisfiable.
                    let list = graph.requirements.entry(node.clone()).or_default();
                    if !list.contains(&req) {
                        list.push(req);
                    }
                }
            }
        }
        Ok(graph)
    }
}

impl UnlockGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Structure API --

    /// Check whether `node` could be added.
    pub fn validate_node(&self, node: &UnlockNode) -> Result<(), UnlockGraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(UnlockGraphError::DuplicateId(node.id.clone()));
        }
        Ok(())
    }

    /// Add a node. Returns false (and changes nothing) if the id is taken.
    pub fn add_node(&mut self, node: UnlockNode) -> bool {
        if let Err(err) = self.validate_node(&node) {
            trace!(%err, "add_node rejected");
            return false;
        }
        debug!(node = %node.id, tier = node.tier, "unlock node added");
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Remove a node and its own requirement list.
    ///
    /// Other nodes that require `id` keep the dangling reference and can
    /// never be unlocked afterwards.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if self.nodes.remove(id).is_none() {
            trace!(node = id, "remove_node: not found");
            return false;
        }
        self.requirements.remove(id);
        debug!(node = id, "unlock node removed");
        true
    }

    /// Check whether the edge `node requires required` could be added.
    pub fn validate_requirement(&self, node: &str, required: &str) -> Result<(), UnlockGraphError> {
        for id in [node, required] {
            if !self.nodes.contains_key(id) {
                return Err(UnlockGraphError::NodeNotFound(id.to_string()));
            }
        }
        if self.would_create_cycle(node, required) {
            return Err(UnlockGraphError::WouldCreateCycle {
                node: node.to_string(),
                required: required.to_string(),
            });
        }
        Ok(())
    }

    /// Whether adding `node requires required` would close a cycle.
    ///
    /// Walks `required`'s requirement chain depth-first; reaching `node`
    /// (or `required == node`) means a cycle. The visited set keeps diamond
    /// shapes from being walked twice.
    pub fn would_create_cycle(&self, node: &str, required: &str) -> bool {
        if node == required {
            return true;
        }

        let mut stack = vec![required];
        let mut visited: HashSet<&str> = HashSet::new();

        while let Some(current) = stack.pop() {
            if current == node {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(reqs) = self.requirements.get(current) {
                stack.extend(
                    reqs.iter()
                        .map(String::as_str)
                        .filter(|r| !visited.contains(r)),
                );
            }
        }
        false
    }

    /// Record that `node` requires `required`.
    ///
    /// Returns false without changing anything if either node is missing or
    /// the edge would create a cycle. Adding an existing edge succeeds as a
    /// no-op.
    pub fn add_requirement(&mut self, node: &str, required: &str) -> bool {
        if let Err(err) = self.validate_requirement(node, required) {
            trace!(%err, "add_requirement rejected");
            return false;
        }

        let list = self.requirements.entry(node.to_string()).or_default();
        if list.iter().any(|r| r == required) {
            return true;
        }
        list.push(required.to_string());
        debug!(node, required, "requirement added");
        true
    }

    /// Drop the edge `node requires required`. Returns false if absent.
    pub fn remove_requirement(&mut self, node: &str, required: &str) -> bool {
        let Some(list) = self.requirements.get_mut(node) else {
            return false;
        };
        let Some(pos) = list.iter().position(|r| r == required) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.requirements.remove(node);
        }
        debug!(node, required, "requirement removed");
        true
    }

    // -- Query API --

    /// Get a node by id.
    pub fn get_node(&self, id: &str) -> Option<&UnlockNode> {
        self.nodes.get(id)
    }

    /// Whether a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterate all nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &UnlockNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of unlocked nodes.
    pub fn unlocked_count(&self) -> usize {
        self.nodes.values().filter(|n| n.unlocked).count()
    }

    /// Direct requirements of a node, in insertion order. May name nodes
    /// that have since been removed.
    pub fn requirements(&self, id: &str) -> &[String] {
        self.requirements.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether every direct requirement of `id` exists and is unlocked.
    ///
    /// Only direct requirements are checked: a node can only have been
    /// unlocked while its own requirements were met, so transitive
    /// satisfaction follows.
    pub fn requirements_met(&self, id: &str) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        self.requirements(id)
            .iter()
            .all(|r| self.nodes.get(r).is_some_and(|n| n.unlocked))
    }

    /// Whether `id` exists, is locked, has its requirements met, and costs
    /// no more than `available`.
    pub fn can_unlock(&self, id: &str, available: &ScaledNumber) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        if node.unlocked || !self.requirements_met(id) {
            return false;
        }
        !available.less_than(&node.cost)
    }

    /// Nodes that [`can_unlock`](Self::can_unlock) with `points`.
    pub fn get_available(&self, points: &ScaledNumber) -> Vec<&UnlockNode> {
        self.nodes
            .values()
            .filter(|n| self.can_unlock(&n.id, points))
            .collect()
    }

    /// All unlocked nodes.
    pub fn get_unlocked(&self) -> Vec<&UnlockNode> {
        self.nodes.values().filter(|n| n.unlocked).collect()
    }

    /// All locked nodes.
    pub fn get_locked(&self) -> Vec<&UnlockNode> {
        self.nodes.values().filter(|n| !n.unlocked).collect()
    }

    /// Nodes in the given tier.
    pub fn nodes_in_tier(&self, tier: i32) -> Vec<&UnlockNode> {
        self.nodes.values().filter(|n| n.tier == tier).collect()
    }

    /// Fraction of nodes unlocked. An empty graph counts as complete.
    pub fn get_progress(&self) -> f64 {
        if self.nodes.is_empty() {
            return 1.0;
        }
        self.unlocked_count() as f64 / self.nodes.len() as f64
    }

    /// Ids of nodes that directly require `id`.
    pub fn get_dependents(&self, id: &str) -> Vec<&str> {
        self.requirements
            .iter()
            .filter(|(_, reqs)| reqs.iter().any(|r| r == id))
            .map(|(node, _)| node.as_str())
            .collect()
    }

    /// All node ids ordered so that every node comes after the nodes it
    /// requires. Ties are broken by id. Dangling requirements are ignored.
    pub fn topological_order(&self) -> Vec<&str> {
        let mut pending: BTreeMap<&str, usize> = self
            .nodes
            .keys()
            .map(|id| {
                let count = self
                    .requirements(id)
                    .iter()
                    .filter(|r| self.nodes.contains_key(r.as_str()))
                    .count();
                (id.as_str(), count)
            })
            .collect();

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = ready.pop_first() {
            order.push(id);
            for dependent in self.get_dependents(id) {
                if let Some(count) = pending.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }
        order
    }

    // -- State transitions --

    /// Mark a node unlocked at `now`.
    ///
    /// Succeeds only if the node exists and is locked. Cost and requirements
    /// are NOT re-checked here; call [`can_unlock`](Self::can_unlock) first
    /// and deduct the cost yourself, or use [`purchase`](Self::purchase).
    pub fn unlock(&mut self, id: &str, now: Timestamp) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            trace!(node = id, "unlock: not found");
            return false;
        };
        if node.unlocked {
            return false;
        }
        node.unlocked = true;
        node.unlock_time = Some(now);
        debug!(node = id, time = now, "node unlocked");

        self.events.emit(UnlockEvent::NodeUnlocked {
            id: id.to_string(),
            time: now,
        });
        true
    }

    /// Unlock `id` if [`can_unlock`](Self::can_unlock) allows it, returning
    /// the cost the caller must deduct.
    pub fn purchase(
        &mut self,
        id: &str,
        available: &ScaledNumber,
        now: Timestamp,
    ) -> Option<ScaledNumber> {
        if !self.can_unlock(id, available) {
            return None;
        }
        let cost = self.nodes.get(id)?.cost;
        self.unlock(id, now).then_some(cost)
    }

    /// Mark a node locked. Returns false if it is missing or already locked.
    pub fn lock(&mut self, id: &str) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            trace!(node = id, "lock: not found");
            return false;
        };
        if !node.unlocked {
            return false;
        }
        node.clear_unlock();
        debug!(node = id, "node locked");

        self.events
            .emit(UnlockEvent::NodeLocked { id: id.to_string() });
        true
    }

    /// Lock every node, keeping the graph structure. Bulk reset does not
    /// emit per-node events.
    pub fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_unlock();
        }
        debug!(nodes = self.nodes.len(), "unlock graph reset");
    }

    // -- Event API --

    /// Register a listener called synchronously on every transition.
    pub fn subscribe(&mut self, listener: Listener<UnlockEvent>) {
        self.events.subscribe(listener);
    }

    /// Drain all pending events. Returns events and clears the internal list.
    pub fn drain_events(&mut self) -> Vec<UnlockEvent> {
        self.events.drain()
    }

    /// Get a read-only view of pending events.
    pub fn pending_events(&self) -> &[UnlockEvent] {
        self.events.pending()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
