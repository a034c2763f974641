//! Destruction-policy variants and per-entity teardown actions.

use serde::{Deserialize, Serialize};

/// What happens to a generator's tracked entities on disable or owner death.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestructionPolicy {
    /// Leave entities in the world; only clear the generator's bookkeeping.
    #[default]
    Nothing,
    /// Remove every tracked entity from the world, living or not.
    Destroy,
    /// Lethal resolution for living creatures; non-creatures are destroyed.
    Kill,
}

/// Action to apply to one tracked entity under a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownAction {
    /// Entity stays in the world, ownerless with respect to this generator.
    Leave,
    /// Entity is removed from the world outright.
    Despawn,
    /// Entity dies in place (corpse handling is external).
    Lethal,
}

impl DestructionPolicy {
    /// Resolve the action for a single tracked entity.
    pub fn action_for(self, is_creature: bool) -> TeardownAction {
        match self {
            DestructionPolicy::Nothing => TeardownAction::Leave,
            DestructionPolicy::Destroy => TeardownAction::Despawn,
            DestructionPolicy::Kill => {
                if is_creature {
                    TeardownAction::Lethal
                } else {
                    TeardownAction::Despawn
                }
            }
        }
    }
}
