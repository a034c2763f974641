//! Spawn materialization: draining queued credits into real entities.
//!
//! Capacity was already reserved at enqueue time, so a factory failure
//! simply leaves the credit queued for the next maintenance pass; no
//! release, no error. Each success attaches the `SpawnedBy` back-reference
//! and joins the owning profile's registry.

use hecs::{Entity, World};

use crate::components::{Generator, PendingSpawn, Placement, Position, SpawnRecord, SpawnedBy, TemplateId, Transform};
use crate::services::EntityFactory;

struct SpawnRequest {
    profile_index: usize,
    template: TemplateId,
    transform: Transform,
    credit: PendingSpawn,
}

/// One maintenance pass for a generator: pop every queued credit, call the
/// factory, record successes, requeue failures in order. Returns the number
/// of entities created.
pub fn materialize(
    world: &mut World,
    generator: Entity,
    factory: &mut dyn EntityFactory,
    now: f64,
) -> usize {
    let owner_transform = world
        .get::<&Position>(generator)
        .map(|p| p.transform)
        .unwrap_or_default();

    // Drain under the component borrow, then act on the world.
    let requests = match world.get::<&mut Generator>(generator) {
        Ok(mut gen) => drain_requests(&mut gen, owner_transform),
        Err(_) => return 0,
    };
    if requests.is_empty() {
        return 0;
    }

    let mut created: Vec<(usize, Entity, TemplateId)> = Vec::new();
    let mut failed: Vec<SpawnRequest> = Vec::new();
    for request in requests {
        match factory.create(world, request.template, request.transform) {
            Some(entity) => {
                // Freshly created entity; insert cannot fail.
                let _ = world.insert_one(
                    entity,
                    SpawnedBy {
                        generator,
                        profile_index: request.profile_index,
                    },
                );
                created.push((request.profile_index, entity, request.template));
            }
            None => failed.push(request),
        }
    }

    if !failed.is_empty() {
        log::debug!(
            "materialize: {} credit(s) left queued after factory failure",
            failed.len()
        );
    }

    if let Ok(mut gen) = world.get::<&mut Generator>(generator) {
        for (profile_index, entity, template) in &created {
            let _ = gen.profiles[*profile_index].spawned.insert(
                *entity,
                SpawnRecord {
                    template: *template,
                    spawned_at: now,
                },
            );
        }
        // Requeue failures preserving their original order.
        for request in failed.into_iter().rev() {
            gen.profiles[request.profile_index]
                .pending
                .push_front(request.credit);
        }
        created.len()
    } else {
        0
    }
}

fn drain_requests(generator: &mut Generator, owner_transform: Transform) -> Vec<SpawnRequest> {
    let mut requests = Vec::new();
    for (profile_index, profile) in generator.profiles.iter_mut().enumerate() {
        let transform = match profile.placement {
            Placement::Absolute(transform) => transform,
            Placement::Owner => owner_transform,
        };
        while let Some(credit) = profile.pending.pop_front() {
            requests.push(SpawnRequest {
                profile_index,
                template: profile.template,
                transform,
                credit,
            });
        }
    }
    requests
}
