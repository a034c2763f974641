//! Generator and spawn-profile components.
//!
//! A `Generator` is attached to the owning entity and holds every piece of
//! mutable scheduling state: the ordered profile list, the aggregate
//! reservation counter, the gate, and the teardown policies. Spawned
//! entities carry a `SpawnedBy` back-reference (id-based, no ownership) so
//! removal notifications can find their way home.

use std::collections::{HashMap, VecDeque};

use hecs::Entity;
use serde::{Deserialize, Serialize};

use spawncraft_logic::constants::PLACEHOLDER_TEMPLATE;
use spawncraft_logic::counts;
use spawncraft_logic::gate::GateLatch;
use spawncraft_logic::policy::DestructionPolicy;

use super::common::Transform;

/// Opaque identifier for an entity template. Id 0 is the placeholder
/// sentinel: such a profile occupies probability-band space but never
/// spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub u32);

impl TemplateId {
    pub const PLACEHOLDER: Self = Self(PLACEHOLDER_TEMPLATE);

    pub fn is_placeholder(self) -> bool {
        self.0 == PLACEHOLDER_TEMPLATE
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        Self::PLACEHOLDER
    }
}

/// Where a profile's entities materialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    /// Fixed world transform.
    Absolute(Transform),
    /// Inherit the owning generator's position at materialization time.
    Owner,
}

/// One outstanding spawn credit: reserved capacity not yet materialized.
#[derive(Debug, Clone, Copy)]
pub struct PendingSpawn {
    /// Sim time (seconds) when the credit was enqueued. Stale credits can
    /// be spotted in diagnostics; they are retried every maintenance pass.
    pub queued_at: f64,
}

/// Registry entry for one live spawned entity.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRecord {
    pub template: TemplateId,
    pub spawned_at: f64,
}

/// One spawn rule owned by a generator.
#[derive(Debug, Clone, Default)]
pub struct SpawnProfile {
    pub template: TemplateId,
    /// Negative probability is the unconditional sentinel.
    pub probability: f32,
    pub init_count: u32,
    /// 0 inherits the generator-level bound.
    pub max_count: u32,
    pub placement: Placement,
    /// Ordered spawn credits awaiting materialization.
    pub pending: VecDeque<PendingSpawn>,
    /// Live spawned entities, id-based lookup only.
    pub spawned: HashMap<Entity, SpawnRecord>,
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Owner
    }
}

impl SpawnProfile {
    /// Alive + queued instances for this profile.
    pub fn total(&self) -> u32 {
        (self.spawned.len() + self.pending.len()) as u32
    }

    pub fn is_placeholder(&self) -> bool {
        self.template.is_placeholder()
    }

    /// Queued + alive has reached the init bound.
    pub fn init_spawned(&self) -> bool {
        counts::init_satisfied(self.total(), self.init_count)
    }

    /// Queued + alive has reached the effective max bound.
    pub fn max_spawned(&self, generator_max: u32) -> bool {
        counts::max_reached(self.total(), counts::effective_max(self.max_count, generator_max))
    }

    /// Remaining capacity toward the init bound.
    pub fn remaining_to_init(&self) -> u32 {
        counts::remaining_to_init(self.total(), self.init_count)
    }

    /// Remaining capacity toward the effective max bound.
    pub fn remaining_to_max(&self, generator_max: u32) -> u32 {
        counts::remaining_to_max(self.total(), counts::effective_max(self.max_count, generator_max))
    }
}

/// Activity gating for a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum GateMode {
    /// No gating; always active.
    #[default]
    Always,
    /// Active within an epoch-seconds window; unset bounds do not constrain.
    RealTime {
        start: Option<i64>,
        end: Option<i64>,
    },
    /// Active while the named world event is available, enabled, and started.
    Event { name: String },
}

/// Why a spawned entity left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalReason {
    PickedUp,
    Destroyed,
    Killed,
}

/// Weak back-reference from a spawned entity to its generator. Removed on
/// the first removal notification, which makes a second call a no-op.
#[derive(Debug, Clone, Copy)]
pub struct SpawnedBy {
    pub generator: Entity,
    pub profile_index: usize,
}

/// The generator role: all spawn-scheduling state of one owning entity.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    /// Ordered profiles; order drives band computation and tie-break.
    pub profiles: Vec<SpawnProfile>,
    /// Aggregate alive + queued across all profiles.
    pub current_create: u32,
    pub init_create: u32,
    /// 0 = unbounded.
    pub max_create: u32,
    pub disabled: bool,
    pub gate: GateMode,
    pub end_policy: DestructionPolicy,
    pub death_policy: DestructionPolicy,
    pub latch: GateLatch,
    /// Seconds between gate evaluations.
    pub heartbeat_secs: f64,
    /// Seconds between regeneration ticks while enabled.
    pub regen_secs: f64,
    /// Delay before the first materialization after an enable commit.
    pub initial_delay_secs: f64,
    /// Guard against scheduling a second regeneration chain.
    pub regen_queued: bool,
}

impl Generator {
    pub fn all_init_spawned(&self) -> bool {
        self.profiles.iter().all(|p| p.init_spawned())
    }

    pub fn all_max_spawned(&self) -> bool {
        self.profiles
            .iter()
            .all(|p| p.max_spawned(self.max_create))
    }

    /// Aggregate ceiling reached (unbounded generators never reach it).
    pub fn max_reached(&self) -> bool {
        counts::max_reached(self.current_create, self.max_create)
    }

    pub fn remaining_to_init(&self) -> u32 {
        counts::remaining_to_init(self.current_create, self.init_create)
    }

    pub fn remaining_to_max(&self) -> u32 {
        counts::remaining_to_max(self.current_create, self.max_create)
    }

    /// Sum of per-profile alive + queued, for invariant checks against
    /// `current_create`.
    pub fn tracked_total(&self) -> u32 {
        self.profiles.iter().map(SpawnProfile::total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(init: u32, max: u32) -> SpawnProfile {
        SpawnProfile {
            template: TemplateId(7),
            probability: 0.5,
            init_count: init,
            max_count: max,
            ..Default::default()
        }
    }

    #[test]
    fn placeholder_template_never_spawns() {
        assert!(TemplateId::PLACEHOLDER.is_placeholder());
        assert!(!TemplateId(3).is_placeholder());
    }

    #[test]
    fn profile_counts_include_pending() {
        let mut p = profile(2, 3);
        p.pending.push_back(PendingSpawn { queued_at: 0.0 });
        assert_eq!(p.total(), 1);
        assert!(!p.init_spawned());
        p.pending.push_back(PendingSpawn { queued_at: 0.0 });
        assert!(p.init_spawned());
        assert!(!p.max_spawned(0));
    }

    #[test]
    fn inherited_max_tracks_generator_bound() {
        let mut p = profile(1, 0);
        p.pending.push_back(PendingSpawn { queued_at: 0.0 });
        p.pending.push_back(PendingSpawn { queued_at: 0.0 });
        assert!(p.max_spawned(2));
        assert!(!p.max_spawned(0)); // generator unbounded too
    }

    #[test]
    fn generator_aggregates_profiles() {
        let mut g = Generator {
            profiles: vec![profile(1, 2), profile(1, 2)],
            init_create: 2,
            max_create: 4,
            ..Default::default()
        };
        assert!(!g.all_init_spawned());
        g.profiles[0].pending.push_back(PendingSpawn { queued_at: 0.0 });
        g.profiles[1].pending.push_back(PendingSpawn { queued_at: 0.0 });
        assert!(g.all_init_spawned());
        assert_eq!(g.tracked_total(), 2);
        assert!(!g.max_reached());
    }
}
