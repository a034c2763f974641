//! Removal notification: spawned entities releasing their reserved slot.
//!
//! Any entity leaving the world (picked up, destroyed, killed) notifies its
//! owning generator through the back-reference it carries. The back-
//! reference is consumed on the first call, so a second call for the same
//! entity is a safe no-op. Disabled generators still honor the call;
//! capacity bookkeeping stays correct while inactive.

use hecs::{Entity, World};

use crate::components::{Generator, RemovalReason, SpawnedBy};

/// Release one tracked entity's capacity. Returns whether bookkeeping
/// changed; unknown or already-released entities are no-ops.
pub fn notify_removed(world: &mut World, entity: Entity, reason: RemovalReason) -> bool {
    // Consuming the back-reference is the idempotency guard.
    let spawned_by = match world.remove_one::<SpawnedBy>(entity) {
        Ok(spawned_by) => spawned_by,
        Err(_) => return false,
    };

    let mut gen = match world.get::<&mut Generator>(spawned_by.generator) {
        Ok(gen) => gen,
        Err(_) => return false,
    };
    let profile = match gen.profiles.get_mut(spawned_by.profile_index) {
        Some(profile) => profile,
        None => return false,
    };

    if profile.spawned.remove(&entity).is_none() {
        return false;
    }
    gen.current_create = gen.current_create.saturating_sub(1);
    log::debug!(
        "generator {:?} released capacity for {:?} ({:?})",
        spawned_by.generator,
        entity,
        reason
    );
    true
}
