//! Lifecycle gate: staged enable/disable driven by time windows or events.
//!
//! Each heartbeat computes a raw "should be enabled" reading and feeds it
//! through the generator's two-observation latch. A single transient
//! reading never commits; two consecutive disagreements flip the committed
//! state and trigger the corresponding side effect.

use spawncraft_logic::gate::window_allows;
use spawncraft_logic::policy::DestructionPolicy;

use crate::components::{GateMode, Generator};
use crate::services::EventStates;

/// What the engine must do after a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    /// No committed change this tick.
    Hold,
    /// Flip to enabled committed. `immediate_init` is set when
    /// `init_create == 0`, which primes right away; otherwise the first
    /// materialization is deferred by the configured initial delay.
    Enabled { immediate_init: bool },
    /// Flip to disabled committed; apply the end-of-window policy.
    Disabled { policy: DestructionPolicy },
}

/// Evaluate the gate for one generator and advance the debounce latch.
pub fn evaluate_gate(
    generator: &mut Generator,
    events: &dyn EventStates,
    now_epoch: i64,
) -> GateAction {
    let raw = match &generator.gate {
        GateMode::Always => Some(true),
        GateMode::RealTime { start, end } => Some(window_allows(now_epoch, *start, *end)),
        GateMode::Event { name } => {
            if events.is_available(name) {
                Some(events.is_enabled(name) && events.is_started(name))
            } else {
                // Unknown event name: no state change this tick.
                None
            }
        }
    };

    let raw = match raw {
        Some(raw) => raw,
        None => return GateAction::Hold,
    };

    let committed_enabled = !generator.disabled;
    if !generator.latch.observe(committed_enabled, raw) {
        return GateAction::Hold;
    }

    generator.disabled = !generator.disabled;
    if generator.disabled {
        GateAction::Disabled {
            policy: generator.end_policy,
        }
    } else {
        GateAction::Enabled {
            immediate_init: generator.init_create == 0,
        }
    }
}
