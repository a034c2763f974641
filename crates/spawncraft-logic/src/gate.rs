//! Gate window math and the two-observation debounce latch.
//!
//! A generator flips between enabled and disabled only after two consecutive
//! ticks observe the same disagreement with the committed state. The latch is
//! an explicit state rather than an ad hoc boolean so the observe-twice
//! contract stays auditable.

use serde::{Deserialize, Serialize};

/// Whether a real-time window allows the generator to run at `now`
/// (epoch seconds). Unset bounds do not constrain.
pub fn window_allows(now: i64, start: Option<i64>, end: Option<i64>) -> bool {
    if let Some(start) = start {
        if now < start {
            return false;
        }
    }
    if let Some(end) = end {
        if now > end {
            return false;
        }
    }
    true
}

/// Debounce latch for staged gate transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateLatch {
    /// Raw readings agree with the committed state.
    #[default]
    Stable,
    /// One reading disagreed; a second consecutive disagreement commits.
    PendingFlip,
}

impl GateLatch {
    /// Feed one raw reading against the committed enabled state.
    ///
    /// Returns `true` exactly when the flip commits (the caller toggles its
    /// committed state). A reading that agrees with the committed state
    /// disarms the latch.
    pub fn observe(&mut self, committed_enabled: bool, raw_enabled: bool) -> bool {
        if raw_enabled == committed_enabled {
            *self = GateLatch::Stable;
            return false;
        }
        match *self {
            GateLatch::Stable => {
                *self = GateLatch::PendingFlip;
                false
            }
            GateLatch::PendingFlip => {
                *self = GateLatch::Stable;
                true
            }
        }
    }
}
