//! Scheduler constants: sentinels, default cadences, loop caps.
//!
//! Plain constants with no engine dependency. Both the core engine and the
//! native simtest use these.

/// Probability sentinel: any negative probability means "always eligible,
/// bypasses RNG banding". Canonical encoding is `-1.0`.
pub const UNCONDITIONAL: f32 = -1.0;

/// Template id reserved for placeholder profiles. A placeholder occupies
/// probability-band space but never spawns anything.
pub const PLACEHOLDER_TEMPLATE: u32 = 0;

/// Count sentinel: a profile `max_count` of 0 inherits the generator-level
/// bound; a generator `max_create` of 0 is unbounded.
pub const INHERIT_COUNT: u32 = 0;

/// Hard cap on priming-loop passes. The priming loop otherwise has no exit
/// when every roll lands in a placeholder band while stop conditions remain
/// unmet.
pub const SELECT_PASS_LIMIT: u32 = 128;

/// Smallest accepted heartbeat/regeneration cadence. A zero cadence would
/// make a rescheduling task immediately due again inside the same drain.
pub const MIN_CADENCE_SECS: f64 = 0.1;

/// Default seconds between generator heartbeats (gate evaluations).
pub const DEFAULT_HEARTBEAT_SECS: f64 = 10.0;

/// Default seconds between regeneration ticks while enabled.
pub const DEFAULT_REGEN_SECS: f64 = 30.0;

/// Default delay before the first materialization after an enable commit.
pub const DEFAULT_INITIAL_DELAY_SECS: f64 = 5.0;

/// Whether a probability value is the unconditional sentinel.
pub fn is_unconditional(probability: f32) -> bool {
    probability < 0.0
}
