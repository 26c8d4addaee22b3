//! Prestige module for the Ascension idle-economy toolkit.
//!
//! A prestige layer converts a player's run total into permanent reward
//! points. Once the total reaches a threshold the player may prestige: the
//! engine computes a reward, banks it, and the caller resets its own
//! progress. Banked points feed a bonus multiplier with diminishing returns.
//!
//! # Default Curve
//!
//! ```text
//! reward     = (current / threshold) ^ scaling_exponent     (0 below threshold)
//! multiplier = 1 + sqrt(points) * 0.1                       (1 with no points)
//! ```
//!
//! # Policies
//!
//! The curve is a [`PrestigePolicy`]. [`PowerLawPolicy`] implements the
//! default above; games supply their own policy to change eligibility,
//! rewards, the multiplier, or to react to each prestige.
//!
//! # Design
//!
//! - The engine never touches the caller's production total.
//! - Ineligible prestiges are a no-op returning zero, not an error.
//! - Banked points never decrease except through [`PrestigeEngine::reset`].
//! - A successful prestige emits [`PrestigeEvent::Performed`] before
//!   returning.

use ascension_core::ScaledNumber;
use ascension_core::clock::Timestamp;
use ascension_core::event::{EventChannel, Listener};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a prestige layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrestigeConfig {
    pub id: Option<String>,
    pub name: Option<String>,
    /// Minimum run total required to prestige.
    pub threshold: ScaledNumber,
    /// Power applied to `current / threshold`.
    pub scaling_exponent: f64,
}

impl Default for PrestigeConfig {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            threshold: ScaledNumber::from_f64(1000.0),
            scaling_exponent: 0.5,
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// The reward curve of a prestige layer.
///
/// Every method has a default implementing the power-law curve, so a policy
/// only overrides what it changes.
pub trait PrestigePolicy {
    /// Whether `current` qualifies for a prestige.
    fn can_prestige(&self, current: &ScaledNumber, threshold: &ScaledNumber) -> bool {
        !current.less_than(threshold)
    }

    /// Reward for prestiging at `current`. Only called when eligible.
    fn calculate_reward(
        &self,
        current: &ScaledNumber,
        threshold: &ScaledNumber,
        scaling_exponent: f64,
    ) -> ScaledNumber {
        power_law_reward(current, threshold, scaling_exponent)
    }

    /// Production multiplier granted by `points` banked points.
    fn bonus_multiplier(&self, points: &ScaledNumber) -> f64 {
        sqrt_bonus(points)
    }

    /// Called after a successful prestige has been banked.
    fn on_prestige(&mut self, _reward: &ScaledNumber) {}
}

/// The default curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerLawPolicy;

impl PrestigePolicy for PowerLawPolicy {}

/// `(current / threshold) ^ scaling_exponent`, or zero below the threshold.
pub fn power_law_reward(
    current: &ScaledNumber,
    threshold: &ScaledNumber,
    scaling_exponent: f64,
) -> ScaledNumber {
    if current.less_than(threshold) {
        return ScaledNumber::ZERO;
    }
    current.divide(*threshold).pow(scaling_exponent)
}

/// `1 + sqrt(points) * 0.1`, or `1` with no points.
pub fn sqrt_bonus(points: &ScaledNumber) -> f64 {
    if !points.greater_than(&ScaledNumber::ZERO) {
        return 1.0;
    }
    1.0 + points.to_f64().sqrt() * 0.1
}

// ---------------------------------------------------------------------------
// Events and snapshots
// ---------------------------------------------------------------------------

/// Events emitted by a prestige engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PrestigeEvent {
    /// A prestige was banked.
    Performed {
        reward: ScaledNumber,
        times_performed: u64,
        time: Timestamp,
    },
}

/// The persisted runtime state of a prestige engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrestigeSnapshot {
    pub accumulated_points: ScaledNumber,
    pub times_performed: u64,
    #[serde(default)]
    pub last_performed_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// PrestigeEngine
// ---------------------------------------------------------------------------

/// A single prestige layer.
#[derive(Debug)]
pub struct PrestigeEngine<P: PrestigePolicy = PowerLawPolicy> {
    config: PrestigeConfig,
    accumulated_points: ScaledNumber,
    times_performed: u64,
    last_performed_at: Option<Timestamp>,
    policy: P,
    events: EventChannel<PrestigeEvent>,
}

impl PrestigeEngine {
    /// Create a layer with the default configuration and curve.
    pub fn new() -> Self {
        Self::from_config(PrestigeConfig::default())
    }

    /// Create a layer with the default curve.
    pub fn from_config(config: PrestigeConfig) -> Self {
        Self::with_policy(config, PowerLawPolicy)
    }
}

impl Default for PrestigeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PrestigePolicy> PrestigeEngine<P> {
    /// Create a layer with a custom policy.
    pub fn with_policy(config: PrestigeConfig, policy: P) -> Self {
        Self {
            config,
            accumulated_points: ScaledNumber::ZERO,
            times_performed: 0,
            last_performed_at: None,
            policy,
            events: EventChannel::new(),
        }
    }

    // -- Configuration --

    /// Set the minimum run total required to prestige.
    pub fn with_threshold(mut self, threshold: ScaledNumber) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the power applied to `current / threshold`.
    pub fn with_scaling_exponent(mut self, scaling_exponent: f64) -> Self {
        self.config.scaling_exponent = scaling_exponent;
        self
    }

    /// Set the layer id used in logs and data files.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.config.id = Some(id.into());
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Change the threshold. Affects future prestiges only.
    pub fn set_threshold(&mut self, threshold: ScaledNumber) {
        self.config.threshold = threshold;
    }

    /// Change the reward exponent. Affects future prestiges only.
    pub fn set_scaling_exponent(&mut self, scaling_exponent: f64) {
        self.config.scaling_exponent = scaling_exponent;
    }

    /// The layer configuration.
    pub fn config(&self) -> &PrestigeConfig {
        &self.config
    }

    /// Layer id, if configured.
    pub fn id(&self) -> Option<&str> {
        self.config.id.as_deref()
    }

    /// Display name, if configured.
    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    /// Minimum run total required to prestige.
    pub fn threshold(&self) -> ScaledNumber {
        self.config.threshold
    }

    /// Power applied to `current / threshold`.
    pub fn scaling_exponent(&self) -> f64 {
        self.config.scaling_exponent
    }

    /// The reward policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Mutable access to the reward policy, e.g. to adjust its tuning.
    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    // -- State --

    /// Points banked across all prestiges since the last reset.
    pub fn accumulated_points(&self) -> ScaledNumber {
        self.accumulated_points
    }

    /// Prestiges performed since the last reset.
    pub fn times_performed(&self) -> u64 {
        self.times_performed
    }

    /// When the most recent prestige happened.
    pub fn last_performed_at(&self) -> Option<Timestamp> {
        self.last_performed_at
    }

    // -- Operations --

    /// Whether `current` qualifies for a prestige.
    pub fn can_prestige(&self, current: &ScaledNumber) -> bool {
        self.policy.can_prestige(current, &self.config.threshold)
    }

    /// The reward a prestige at `current` would grant. Zero when ineligible.
    pub fn calculate_reward(&self, current: &ScaledNumber) -> ScaledNumber {
        if !self.can_prestige(current) {
            return ScaledNumber::ZERO;
        }
        self.policy.calculate_reward(
            current,
            &self.config.threshold,
            self.config.scaling_exponent,
        )
    }

    /// Bank `points` directly. Negative amounts are ignored.
    pub fn add_points(&mut self, points: ScaledNumber) {
        if points.is_negative() {
            trace!(points = %points, "add_points: ignoring negative amount");
            return;
        }
        self.accumulated_points.add_in_place(points);
    }

    /// Prestige at `current`.
    ///
    /// When ineligible, returns zero and changes nothing. Otherwise banks the
    /// reward, bumps the counter, stamps `now`, runs the policy hook, emits
    /// [`PrestigeEvent::Performed`], and returns the reward. Resetting the
    /// caller's run total is the caller's job.
    pub fn perform(&mut self, current: &ScaledNumber, now: Timestamp) -> ScaledNumber {
        if !self.can_prestige(current) {
            trace!(current = %current, threshold = %self.config.threshold, "prestige below threshold");
            return ScaledNumber::ZERO;
        }

        // Rewards never reduce the banked total.
        let reward = self.calculate_reward(current).max(ScaledNumber::ZERO);
        self.accumulated_points.add_in_place(reward);
        self.times_performed += 1;
        self.last_performed_at = Some(now);
        self.policy.on_prestige(&reward);

        debug!(
            layer = self.config.id.as_deref().unwrap_or("-"),
            reward = %reward,
            total = %self.accumulated_points,
            times = self.times_performed,
            "prestige performed"
        );

        self.events.emit(PrestigeEvent::Performed {
            reward,
            times_performed: self.times_performed,
            time: now,
        });
        reward
    }

    /// Multiplier granted by the banked points.
    pub fn bonus_multiplier(&self) -> f64 {
        self.policy.bonus_multiplier(&self.accumulated_points)
    }

    /// Clear banked points and the counter. Configuration is kept.
    pub fn reset(&mut self) {
        self.accumulated_points = ScaledNumber::ZERO;
        self.times_performed = 0;
        self.last_performed_at = None;
        debug!(layer = self.config.id.as_deref().unwrap_or("-"), "prestige layer reset");
    }

    // -- Persistence --

    /// Capture the runtime state for saving.
    pub fn snapshot(&self) -> PrestigeSnapshot {
        PrestigeSnapshot {
            accumulated_points: self.accumulated_points,
            times_performed: self.times_performed,
            last_performed_at: self.last_performed_at,
        }
    }

    /// Replace the runtime state with a saved snapshot. Does not emit events.
    pub fn restore(&mut self, snapshot: &PrestigeSnapshot) {
        self.accumulated_points = snapshot.accumulated_points;
        self.times_performed = snapshot.times_performed;
        self.last_performed_at = snapshot.last_performed_at;
    }

    // -- Event API --

    /// Register a listener called synchronously on every prestige.
    pub fn subscribe(&mut self, listener: Listener<PrestigeEvent>) {
        self.events.subscribe(listener);
    }

    /// Drain all pending events. Returns events and clears the internal list.
    pub fn drain_events(&mut self) -> Vec<PrestigeEvent> {
        self.events.drain()
    }

    /// Get a read-only view of pending events.
    pub fn pending_events(&self) -> &[PrestigeEvent] {
        self.events.pending()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn n(v: f64) -> ScaledNumber {
        ScaledNumber::from_f64(v)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // -----------------------------------------------------------------------
    // Threshold boundary
    // -----------------------------------------------------------------------

    #[test]
    fn defaults() {
        let engine = PrestigeEngine::new();
        assert_eq!(engine.threshold(), n(1000.0));
        assert_eq!(engine.scaling_exponent(), 0.5);
        assert!(engine.accumulated_points().is_zero());
        assert_eq!(engine.times_performed(), 0);
        assert_eq!(engine.bonus_multiplier(), 1.0);
    }

    #[test]
    fn below_threshold_is_noop() {
        let mut engine = PrestigeEngine::new();
        assert!(!engine.can_prestige(&n(999.0)));
        assert!(engine.calculate_reward(&n(999.0)).is_zero());

        let reward = engine.perform(&n(999.0), 10);
        assert!(reward.is_zero());
        assert_eq!(engine.times_performed(), 0);
        assert!(engine.accumulated_points().is_zero());
        assert_eq!(engine.last_performed_at(), None);
        assert!(engine.pending_events().is_empty());
    }

    #[test]
    fn exactly_at_threshold_rewards_one() {
        let mut engine = PrestigeEngine::new();
        assert!(engine.can_prestige(&n(1000.0)));
        let reward = engine.perform(&n(1000.0), 0);
        assert!(approx(reward.to_f64(), 1.0));
    }

    #[test]
    fn perform_banks_power_law_reward() {
        let mut engine = PrestigeEngine::new();
        let reward = engine.perform(&n(4000.0), 1_700_000_000);

        assert!(approx(reward.to_f64(), 2.0));
        assert!(approx(engine.accumulated_points().to_f64(), 2.0));
        assert_eq!(engine.times_performed(), 1);
        assert_eq!(engine.last_performed_at(), Some(1_700_000_000));

        engine.perform(&n(9000.0), 1_700_000_100);
        assert!(approx(engine.accumulated_points().to_f64(), 5.0));
        assert_eq!(engine.times_performed(), 2);
    }

    #[test]
    fn reward_for_huge_values() {
        let engine = PrestigeEngine::new();
        // (1e403 / 1e3) ^ 0.5 = 1e200
        let reward = engine.calculate_reward(&ScaledNumber::from_parts(1.0, 403));
        assert_eq!(reward.exponent(), 200);
        assert!(approx(reward.mantissa(), 1.0));
    }

    // -----------------------------------------------------------------------
    // Bonus multiplier
    // -----------------------------------------------------------------------

    #[test]
    fn bonus_multiplier_uses_square_root() {
        let mut engine = PrestigeEngine::new();
        engine.add_points(n(100.0));
        assert!(approx(engine.bonus_multiplier(), 2.0));
    }

    #[test]
    fn add_points_ignores_negative() {
        let mut engine = PrestigeEngine::new();
        engine.add_points(n(25.0));
        engine.add_points(n(-10.0));
        assert!(approx(engine.accumulated_points().to_f64(), 25.0));
    }

    // -----------------------------------------------------------------------
    // Reset and configuration
    // -----------------------------------------------------------------------

    #[test]
    fn reset_keeps_configuration() {
        let mut engine = PrestigeEngine::new()
            .with_id("ascend")
            .with_name("Ascension")
            .with_threshold(n(1e6))
            .with_scaling_exponent(0.25);
        engine.perform(&n(1e10), 5);
        assert_eq!(engine.times_performed(), 1);

        engine.reset();
        assert!(engine.accumulated_points().is_zero());
        assert_eq!(engine.times_performed(), 0);
        assert_eq!(engine.last_performed_at(), None);
        assert_eq!(engine.id(), Some("ascend"));
        assert_eq!(engine.name(), Some("Ascension"));
        assert_eq!(engine.threshold(), n(1e6));
        assert_eq!(engine.scaling_exponent(), 0.25);
    }

    #[test]
    fn setters_change_future_rewards() {
        let mut engine = PrestigeEngine::new();
        engine.set_threshold(n(10.0));
        engine.set_scaling_exponent(1.0);
        assert!(approx(engine.calculate_reward(&n(50.0)).to_f64(), 5.0));
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    #[test]
    fn perform_emits_once() {
        let mut engine = PrestigeEngine::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.subscribe(Box::new(move |e| sink.borrow_mut().push(e.clone())));

        engine.perform(&n(4000.0), 99);
        engine.perform(&n(10.0), 100);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        let PrestigeEvent::Performed {
            reward,
            times_performed,
            time,
        } = &seen[0];
        assert!(approx(reward.to_f64(), 2.0));
        assert_eq!(*times_performed, 1);
        assert_eq!(*time, 99);
        assert_eq!(engine.drain_events().len(), 1);
    }

    // -----------------------------------------------------------------------
    // Custom policy
    // -----------------------------------------------------------------------

    /// Flat 10 points per prestige, counts hook calls.
    #[derive(Debug, Default)]
    struct FlatPolicy {
        hook_calls: u32,
    }

    impl PrestigePolicy for FlatPolicy {
        fn calculate_reward(&self, _: &ScaledNumber, _: &ScaledNumber, _: f64) -> ScaledNumber {
            ScaledNumber::from_f64(10.0)
        }

        fn bonus_multiplier(&self, points: &ScaledNumber) -> f64 {
            1.0 + points.to_f64() / 100.0
        }

        fn on_prestige(&mut self, _reward: &ScaledNumber) {
            self.hook_calls += 1;
        }
    }

    #[test]
    fn custom_policy_overrides_curve() {
        let mut engine = PrestigeEngine::with_policy(PrestigeConfig::default(), FlatPolicy::default());
        engine.perform(&n(1e9), 0);
        engine.perform(&n(1e3), 1);
        engine.perform(&n(1.0), 2);

        assert!(approx(engine.accumulated_points().to_f64(), 20.0));
        assert_eq!(engine.policy().hook_calls, 2);
        assert!(approx(engine.bonus_multiplier(), 1.2));
    }

    /// Tries to hand out a negative reward.
    struct PenaltyPolicy;

    impl PrestigePolicy for PenaltyPolicy {
        fn calculate_reward(&self, _: &ScaledNumber, _: &ScaledNumber, _: f64) -> ScaledNumber {
            ScaledNumber::from_f64(-5.0)
        }
    }

    #[test]
    fn negative_rewards_are_clamped() {
        let mut engine = PrestigeEngine::with_policy(PrestigeConfig::default(), PenaltyPolicy);
        engine.add_points(n(3.0));
        let reward = engine.perform(&n(5000.0), 0);
        assert!(reward.is_zero());
        assert!(approx(engine.accumulated_points().to_f64(), 3.0));
        assert_eq!(engine.times_performed(), 1);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_round_trip() {
        let mut engine = PrestigeEngine::new();
        engine.perform(&n(16_000.0), 1234);

        let json = serde_json::to_string(&engine.snapshot()).unwrap();
        let snapshot: PrestigeSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = PrestigeEngine::new();
        restored.restore(&snapshot);
        assert_eq!(restored.snapshot(), engine.snapshot());
        assert!(approx(restored.accumulated_points().to_f64(), 4.0));
        assert!(restored.pending_events().is_empty());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: PrestigeConfig = serde_json::from_str(r#"{"id": "layer1"}"#).unwrap();
        assert_eq!(config.id.as_deref(), Some("layer1"));
        assert_eq!(config.threshold, n(1000.0));
        assert_eq!(config.scaling_exponent, 0.5);
    }
}
