//! Generator construction - building generator entities from definitions.
//!
//! Definitions are the persisted shape of a generator: plain serde types
//! loadable from JSON. Construction happens once per generator entity;
//! profiles live for the lifetime of the owner and are only ever cleared,
//! never rebuilt.

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use spawncraft_logic::constants::{
    DEFAULT_HEARTBEAT_SECS, DEFAULT_INITIAL_DELAY_SECS, DEFAULT_REGEN_SECS, MIN_CADENCE_SECS,
    UNCONDITIONAL,
};
use spawncraft_logic::policy::DestructionPolicy;

use crate::components::{
    GateMode, Generator, Placement, Position, SpawnProfile, TemplateId, Transform,
};
use crate::scheduler::{Scheduler, TaskKind};

/// One spawn rule in a generator definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDef {
    pub template: u32,
    pub probability: f32,
    #[serde(default)]
    pub init_count: u32,
    /// 0 inherits the generator bound.
    #[serde(default)]
    pub max_count: u32,
    /// Absent means "inherit owner's position".
    #[serde(default)]
    pub placement: Option<Transform>,
}

/// A linked sibling instance: synthesized into an unconditional one-shot
/// profile anchored at the sibling's own transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedSpawnDef {
    pub template: u32,
    pub transform: Transform,
}

/// Persisted template for one generator entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorDef {
    pub label: String,
    pub position: Transform,
    #[serde(default)]
    pub init_create: u32,
    /// 0 = unbounded.
    #[serde(default)]
    pub max_create: u32,
    #[serde(default)]
    pub gate: GateMode,
    #[serde(default)]
    pub end_policy: DestructionPolicy,
    #[serde(default)]
    pub death_policy: DestructionPolicy,
    pub profiles: Vec<ProfileDef>,
    #[serde(default)]
    pub linked: Vec<LinkedSpawnDef>,
    #[serde(default = "default_heartbeat")]
    pub heartbeat_secs: f64,
    #[serde(default = "default_regen")]
    pub regen_secs: f64,
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: f64,
}

fn default_heartbeat() -> f64 {
    DEFAULT_HEARTBEAT_SECS
}

fn default_regen() -> f64 {
    DEFAULT_REGEN_SECS
}

fn default_initial_delay() -> f64 {
    DEFAULT_INITIAL_DELAY_SECS
}

impl Default for GeneratorDef {
    fn default() -> Self {
        Self {
            label: "generator".to_string(),
            position: Transform::default(),
            init_create: 0,
            max_create: 0,
            gate: GateMode::Always,
            end_policy: DestructionPolicy::Nothing,
            death_policy: DestructionPolicy::Nothing,
            profiles: Vec::new(),
            linked: Vec::new(),
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
            regen_secs: DEFAULT_REGEN_SECS,
            initial_delay_secs: DEFAULT_INITIAL_DELAY_SECS,
        }
    }
}

/// Rescheduling cadences must stay positive or a task becomes immediately
/// due again inside the same update drain.
fn clamp_cadence(secs: f64, field: &str, label: &str) -> f64 {
    if secs < MIN_CADENCE_SECS {
        log::warn!(
            "generator '{}': {} of {}s below minimum, clamping to {}s",
            label,
            field,
            secs,
            MIN_CADENCE_SECS
        );
        MIN_CADENCE_SECS
    } else {
        secs
    }
}

/// Parse a JSON array of generator definitions.
pub fn defs_from_json(json: &str) -> Result<Vec<GeneratorDef>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Build a generator entity in the world and queue its first heartbeat.
///
/// Generators start cold (disabled); the gate debounce brings them up on
/// their first heartbeats.
pub fn spawn_generator(
    world: &mut World,
    scheduler: &mut Scheduler,
    def: &GeneratorDef,
    now: f64,
) -> Entity {
    let mut profiles: Vec<SpawnProfile> = def
        .profiles
        .iter()
        .map(|p| SpawnProfile {
            template: TemplateId(p.template),
            probability: p.probability,
            init_count: p.init_count,
            max_count: p.max_count,
            placement: match p.placement {
                Some(transform) => Placement::Absolute(transform),
                None => Placement::Owner,
            },
            ..Default::default()
        })
        .collect();

    // Linked siblings become unconditional one-shots at fixed transforms.
    profiles.extend(def.linked.iter().map(|link| SpawnProfile {
        template: TemplateId(link.template),
        probability: UNCONDITIONAL,
        init_count: 1,
        max_count: 1,
        placement: Placement::Absolute(link.transform),
        ..Default::default()
    }));

    let generator = Generator {
        profiles,
        current_create: 0,
        init_create: def.init_create,
        max_create: def.max_create,
        disabled: true,
        gate: def.gate.clone(),
        end_policy: def.end_policy,
        death_policy: def.death_policy,
        latch: Default::default(),
        heartbeat_secs: clamp_cadence(def.heartbeat_secs, "heartbeat_secs", &def.label),
        regen_secs: clamp_cadence(def.regen_secs, "regen_secs", &def.label),
        initial_delay_secs: def.initial_delay_secs,
        regen_queued: false,
    };

    let entity = world.spawn((
        generator,
        Position {
            transform: def.position,
        },
    ));
    scheduler.schedule(now, entity, TaskKind::Heartbeat);
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec3;

    #[test]
    fn definition_builds_profiles_in_order() {
        let mut world = World::new();
        let mut scheduler = Scheduler::new();
        let def = GeneratorDef {
            init_create: 2,
            max_create: 4,
            profiles: vec![
                ProfileDef {
                    template: 1,
                    probability: 0.5,
                    init_count: 1,
                    max_count: 2,
                    placement: None,
                },
                ProfileDef {
                    template: 2,
                    probability: 1.0,
                    init_count: 1,
                    max_count: 0,
                    placement: Some(Transform::at(Vec3::new(5.0, 0.0, 0.0))),
                },
            ],
            ..Default::default()
        };

        let entity = spawn_generator(&mut world, &mut scheduler, &def, 0.0);
        let gen = world.get::<&Generator>(entity).unwrap();
        assert!(gen.disabled);
        assert_eq!(gen.profiles.len(), 2);
        assert_eq!(gen.profiles[0].template, TemplateId(1));
        assert_eq!(gen.profiles[1].placement, Placement::Absolute(Transform::at(Vec3::new(5.0, 0.0, 0.0))));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn linked_siblings_become_unconditional_one_shots() {
        let mut world = World::new();
        let mut scheduler = Scheduler::new();
        let def = GeneratorDef {
            linked: vec![LinkedSpawnDef {
                template: 9,
                transform: Transform::at(Vec3::new(1.0, 1.0, 0.0)),
            }],
            ..Default::default()
        };

        let entity = spawn_generator(&mut world, &mut scheduler, &def, 0.0);
        let gen = world.get::<&Generator>(entity).unwrap();
        let linked = &gen.profiles[0];
        assert!(linked.probability < 0.0);
        assert_eq!(linked.init_count, 1);
        assert_eq!(linked.max_count, 1);
        assert!(matches!(linked.placement, Placement::Absolute(_)));
    }

    #[test]
    fn zero_cadences_are_clamped_to_the_minimum() {
        let mut world = World::new();
        let mut scheduler = Scheduler::new();
        let def = GeneratorDef {
            heartbeat_secs: 0.0,
            regen_secs: 0.0,
            ..Default::default()
        };

        let entity = spawn_generator(&mut world, &mut scheduler, &def, 0.0);
        let gen = world.get::<&Generator>(entity).unwrap();
        assert!(gen.heartbeat_secs >= MIN_CADENCE_SECS);
        assert!(gen.regen_secs >= MIN_CADENCE_SECS);
    }

    #[test]
    fn defs_round_trip_through_json() {
        let json = r#"[{
            "label": "bandit camp",
            "position": { "position": { "x": 10.0, "y": 0.0, "z": 3.0 }, "heading": 0.0 },
            "init_create": 2,
            "max_create": 5,
            "gate": { "Event": { "name": "raid_season" } },
            "end_policy": "Destroy",
            "profiles": [
                { "template": 11, "probability": 0.7, "init_count": 1 },
                { "template": 12, "probability": 1.0, "init_count": 1, "max_count": 3 }
            ]
        }]"#;

        let defs = defs_from_json(json).expect("valid defs");
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].profiles.len(), 2);
        assert_eq!(defs[0].end_policy, DestructionPolicy::Destroy);
        assert_eq!(defs[0].heartbeat_secs, DEFAULT_HEARTBEAT_SECS);
        assert!(matches!(defs[0].gate, GateMode::Event { .. }));
    }
}
