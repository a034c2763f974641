//! Destruction policy application and bookkeeping reset.
//!
//! Runs on disable and on owner death, outside the normal tick. Whatever
//! the policy does to the tracked entities, the generator's own bookkeeping
//! always ends empty: queues and registries cleared, `current_create` zero.

use hecs::{Entity, World};

use spawncraft_logic::policy::{DestructionPolicy, TeardownAction};

use crate::components::{Creature, Dead, Generator, SpawnedBy};

/// Apply `policy` to every entity tracked by `generator`, then clear all
/// bookkeeping. Missing tracked entities are skipped silently.
pub fn apply_policy(world: &mut World, generator: Entity, policy: DestructionPolicy) {
    let tracked = match world.get::<&mut Generator>(generator) {
        Ok(mut gen) => {
            let mut tracked: Vec<Entity> = Vec::new();
            for profile in &mut gen.profiles {
                tracked.extend(profile.spawned.keys().copied());
                profile.spawned.clear();
                profile.pending.clear();
            }
            gen.current_create = 0;
            tracked
        }
        Err(_) => return,
    };

    for entity in tracked {
        if !world.contains(entity) {
            continue;
        }
        let is_creature = world
            .get::<&Creature>(entity)
            .map(|c| c.is_alive())
            .unwrap_or(false);

        match policy.action_for(is_creature) {
            TeardownAction::Leave => {
                // Entity stays in the world, ownerless from here on.
                let _ = world.remove_one::<SpawnedBy>(entity);
            }
            TeardownAction::Despawn => {
                let _ = world.despawn(entity);
            }
            TeardownAction::Lethal => {
                if let Ok(mut creature) = world.get::<&mut Creature>(entity) {
                    creature.health = 0.0;
                }
                let _ = world.insert_one(entity, Dead);
                let _ = world.remove_one::<SpawnedBy>(entity);
            }
        }
    }
}
