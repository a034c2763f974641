//! Capacity predicates and enqueue batch sizing.
//!
//! All counts are "alive + queued"; capacity is reserved at enqueue time,
//! not at successful materialization. Bound encoding: `0` means inherit
//! (profile max) or unbounded (generator max); init bounds are plain counts.

use crate::constants::INHERIT_COUNT;

/// Resolve a profile's max bound: `0` inherits the generator-level bound.
pub fn effective_max(profile_max: u32, generator_max: u32) -> u32 {
    if profile_max == INHERIT_COUNT {
        generator_max
    } else {
        profile_max
    }
}

/// Whether the init bound is satisfied. An init bound of zero is trivially
/// satisfied.
pub fn init_satisfied(current: u32, init: u32) -> bool {
    current >= init
}

/// Whether a max bound has been reached. A bound of zero is unbounded and
/// is never reached. Uses `>=` so counter drift self-corrects.
pub fn max_reached(current: u32, max: u32) -> bool {
    max != 0 && current >= max
}

/// Remaining capacity toward an init bound.
pub fn remaining_to_init(current: u32, init: u32) -> u32 {
    init.saturating_sub(current)
}

/// Remaining capacity toward a max bound; unbounded when the bound is zero.
pub fn remaining_to_max(current: u32, max: u32) -> u32 {
    if max == 0 {
        u32::MAX
    } else {
        max.saturating_sub(current)
    }
}

/// How many credits to enqueue for one firing profile: never exceed either
/// the profile's remaining capacity or the generator's.
pub fn batch_size(profile_remaining: u32, generator_remaining: u32) -> u32 {
    profile_remaining.min(generator_remaining)
}
