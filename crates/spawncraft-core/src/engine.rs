//! Simulation engine - main entry point for running generators
//!
//! The engine owns the ECS world, the task scheduler, the roll source, and
//! the collaborator services. All generator mutation happens inside its
//! single-threaded `update()` drain or inside the synchronous notification
//! entry points, so no locking is needed.

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::components::{Generator, RemovalReason};
use crate::generation::{spawn_generator, GeneratorDef};
use crate::scheduler::{Scheduler, TaskKind};
use crate::services::{
    CatalogFactory, EntityFactory, EventCalendar, RollSource, TemplateCatalog, UniformRolls,
};
use crate::systems::{apply_policy, evaluate_gate, materialize, notify_removed, select_init, select_max, GateAction};

/// Main spawn-scheduling engine
pub struct SimulationEngine {
    /// ECS world containing generators and spawned entities
    pub world: World,
    /// Simulation time in seconds since start
    pub sim_time: f64,
    /// World-event state queried by event-gated generators
    pub events: EventCalendar,

    scheduler: Scheduler,
    factory: Box<dyn EntityFactory>,
    rolls: Box<dyn RollSource>,
    /// Epoch seconds corresponding to `sim_time == 0`.
    epoch_offset: i64,
    time_scale: f32,
}

impl SimulationEngine {
    /// Create a new engine with an empty catalog and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an engine with a fixed RNG seed for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            world: World::new(),
            sim_time: 0.0,
            events: EventCalendar::new(),
            scheduler: Scheduler::new(),
            factory: Box::new(CatalogFactory::default()),
            rolls: Box::new(UniformRolls(rng)),
            epoch_offset: 0,
            time_scale: 1.0,
        }
    }

    /// Replace the factory with a catalog-backed one.
    pub fn set_catalog(&mut self, catalog: TemplateCatalog) {
        self.factory = Box::new(CatalogFactory::new(catalog));
    }

    /// Replace the factory outright (tests inject failing factories here).
    pub fn set_factory(&mut self, factory: Box<dyn EntityFactory>) {
        self.factory = factory;
    }

    /// Replace the roll source (tests inject scripted rolls here).
    pub fn set_roll_source(&mut self, rolls: Box<dyn RollSource>) {
        self.rolls = rolls;
    }

    /// Anchor sim time to an epoch instant (for real-time gate windows).
    pub fn set_epoch_offset(&mut self, epoch_seconds: i64) {
        self.epoch_offset = epoch_seconds;
    }

    /// Current epoch time as seen by real-time gates.
    pub fn epoch_now(&self) -> i64 {
        self.epoch_offset + self.sim_time as i64
    }

    /// Build a generator entity from its definition and queue its first
    /// heartbeat.
    pub fn add_generator(&mut self, def: GeneratorDef) -> Entity {
        spawn_generator(&mut self.world, &mut self.scheduler, &def, self.sim_time)
    }

    /// Advance the simulation by `delta_seconds` and run every due task.
    pub fn update(&mut self, delta_seconds: f32) {
        self.sim_time += (delta_seconds * self.time_scale) as f64;

        while let Some((entity, kind)) = self.scheduler.pop_due(self.sim_time) {
            // Cancellation-by-guard: a despawned generator's queued tasks
            // fall through here.
            if self.world.get::<&Generator>(entity).is_err() {
                continue;
            }
            match kind {
                TaskKind::Heartbeat => self.heartbeat(entity),
                TaskKind::Regenerate => self.regenerate_task(entity),
                TaskKind::FirstSpawn => self.prime(entity),
            }
        }
    }

    /// Generic per-entity heartbeat: gate evaluation plus startup on the
    /// first activation. Reschedules itself.
    pub fn heartbeat(&mut self, entity: Entity) {
        let epoch = self.epoch_now();
        let (action, heartbeat_secs, initial_delay_secs) = {
            let mut gen = match self.world.get::<&mut Generator>(entity) {
                Ok(gen) => gen,
                Err(_) => return,
            };
            let action = evaluate_gate(&mut gen, &self.events, epoch);
            (action, gen.heartbeat_secs, gen.initial_delay_secs)
        };

        match action {
            GateAction::Hold => {}
            GateAction::Enabled { immediate_init } => {
                if immediate_init {
                    self.prime(entity);
                } else {
                    self.scheduler.schedule(
                        self.sim_time + initial_delay_secs,
                        entity,
                        TaskKind::FirstSpawn,
                    );
                }
                self.queue_regen(entity);
            }
            GateAction::Disabled { policy } => {
                apply_policy(&mut self.world, entity, policy);
            }
        }

        self.scheduler
            .schedule(self.sim_time + heartbeat_secs, entity, TaskKind::Heartbeat);
    }

    /// Generator-specific periodic tick: steady-state select + materialize.
    pub fn regenerate(&mut self, entity: Entity) {
        let now = self.sim_time;
        {
            let mut gen = match self.world.get::<&mut Generator>(entity) {
                Ok(gen) => gen,
                Err(_) => return,
            };
            if gen.disabled {
                return;
            }
            let _ = select_max(&mut *gen, self.rolls.as_mut(), now);
        }
        let _ = materialize(&mut self.world, entity, self.factory.as_mut(), now);
    }

    /// Called by any entity when it leaves the world (picked up, destroyed,
    /// killed). Honored even while the generator is disabled.
    pub fn notify_removed(&mut self, entity: Entity, reason: RemovalReason) -> bool {
        notify_removed(&mut self.world, entity, reason)
    }

    /// Called by death resolution when the owning entity dies.
    pub fn on_owner_death(&mut self, entity: Entity) {
        let policy = match self.world.get::<&Generator>(entity) {
            Ok(gen) => gen.death_policy,
            Err(_) => return,
        };
        apply_policy(&mut self.world, entity, policy);
    }

    /// Administrative reset: clear all bookkeeping, force the gate open,
    /// and re-prime. The next heartbeat re-evaluates the gate as usual.
    pub fn reset(&mut self, entity: Entity) {
        apply_policy(
            &mut self.world,
            entity,
            spawncraft_logic::policy::DestructionPolicy::Nothing,
        );
        if let Ok(mut gen) = self.world.get::<&mut Generator>(entity) {
            gen.disabled = false;
            gen.latch = Default::default();
        }
        self.prime(entity);
        self.queue_regen(entity);
    }

    /// Prime toward the init bounds and materialize immediately.
    fn prime(&mut self, entity: Entity) {
        let now = self.sim_time;
        {
            let mut gen = match self.world.get::<&mut Generator>(entity) {
                Ok(gen) => gen,
                Err(_) => return,
            };
            // A disable may have committed while this task sat queued.
            if gen.disabled {
                return;
            }
            let _ = select_init(&mut *gen, self.rolls.as_mut(), now);
        }
        let _ = materialize(&mut self.world, entity, self.factory.as_mut(), now);
    }

    /// Scheduled regeneration wrapper: runs the tick and re-arms itself
    /// while the generator stays enabled.
    fn regenerate_task(&mut self, entity: Entity) {
        let (disabled, regen_secs) = match self.world.get::<&mut Generator>(entity) {
            Ok(mut gen) => {
                if gen.disabled {
                    gen.regen_queued = false;
                }
                (gen.disabled, gen.regen_secs)
            }
            Err(_) => return,
        };
        if disabled {
            return;
        }

        self.regenerate(entity);
        self.scheduler
            .schedule(self.sim_time + regen_secs, entity, TaskKind::Regenerate);
    }

    /// Arm the regeneration chain exactly once.
    fn queue_regen(&mut self, entity: Entity) {
        let (already_queued, regen_secs) = match self.world.get::<&mut Generator>(entity) {
            Ok(mut gen) => {
                let queued = gen.regen_queued;
                gen.regen_queued = true;
                (queued, gen.regen_secs)
            }
            Err(_) => return,
        };
        if !already_queued {
            self.scheduler
                .schedule(self.sim_time + regen_secs, entity, TaskKind::Regenerate);
        }
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Get current time scale
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Get current simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Count generator entities
    pub fn generator_count(&self) -> usize {
        self.world.query::<&Generator>().iter().count()
    }

    /// A generator's aggregate alive + queued count
    pub fn current_create(&self, entity: Entity) -> u32 {
        self.world
            .get::<&Generator>(entity)
            .map(|g| g.current_create)
            .unwrap_or(0)
    }

    /// Live spawned entities tracked by a generator
    pub fn spawned_count(&self, entity: Entity) -> usize {
        self.world
            .get::<&Generator>(entity)
            .map(|g| g.profiles.iter().map(|p| p.spawned.len()).sum())
            .unwrap_or(0)
    }

    /// Per-profile alive + queued sum, for invariant checks
    pub fn tracked_total(&self, entity: Entity) -> u32 {
        self.world
            .get::<&Generator>(entity)
            .map(|g| g.tracked_total())
            .unwrap_or(0)
    }

    /// Save scheduler state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_simulation(
            writer,
            &self.world,
            self.sim_time,
            self.time_scale,
            self.epoch_offset,
            &self.events,
        )
    }

    /// Load scheduler state from a reader. Generators come back cold and
    /// re-prime through their normal gate debounce.
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_simulation(reader)?;

        self.world = World::new();
        self.scheduler.clear();
        self.sim_time = loaded.sim_time;
        self.time_scale = loaded.time_scale;
        self.epoch_offset = loaded.epoch_offset;
        self.events = loaded.events;
        for def in &loaded.generators {
            let _ = spawn_generator(&mut self.world, &mut self.scheduler, def, self.sim_time);
        }
        Ok(())
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{GateMode, TemplateId};
    use crate::generation::ProfileDef;
    use spawncraft_logic::policy::DestructionPolicy;

    fn catalog() -> TemplateCatalog {
        let mut catalog = TemplateCatalog::new();
        catalog.insert_creature(TemplateId(1), "gloom wolf", 40.0);
        catalog.insert_creature(TemplateId(2), "bog stalker", 60.0);
        catalog.insert_object(TemplateId(3), "supply cache");
        catalog
    }

    fn profile(template: u32, probability: f32, init: u32, max: u32) -> ProfileDef {
        ProfileDef {
            template,
            probability,
            init_count: init,
            max_count: max,
            placement: None,
        }
    }

    fn engine_with(def: GeneratorDef) -> (SimulationEngine, Entity) {
        let mut engine = SimulationEngine::with_seed(7);
        engine.set_catalog(catalog());
        let entity = engine.add_generator(def);
        (engine, entity)
    }

    #[test]
    fn test_engine_creation() {
        let engine = SimulationEngine::new();
        assert_eq!(engine.generator_count(), 0);
        assert_eq!(engine.sim_time(), 0.0);
    }

    #[test]
    fn test_time_scale() {
        let mut engine = SimulationEngine::new();
        engine.set_time_scale(2.0);
        engine.update(1.0); // 1 real second = 2 sim seconds
        assert!((engine.sim_time() - 2.0).abs() < 0.0001);
    }

    #[test]
    fn primes_one_then_tops_up_to_max() {
        let def = GeneratorDef {
            init_create: 1,
            max_create: 2,
            profiles: vec![profile(1, 0.99, 1, 0), profile(2, 0.01, 1, 0)],
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);

        engine.reset(entity);
        assert_eq!(engine.spawned_count(entity), 1);
        assert_eq!(engine.current_create(entity), 1);

        // Top-ups may add at most one more, never exceeding 2 total.
        for _ in 0..10 {
            engine.regenerate(entity);
            assert!(engine.current_create(entity) <= 2);
            assert_eq!(engine.tracked_total(entity), engine.current_create(entity));
        }
        assert_eq!(engine.current_create(entity), 2);
    }

    #[test]
    fn unconditional_profile_always_primes() {
        let def = GeneratorDef {
            init_create: 2,
            max_create: 2,
            profiles: vec![profile(1, -1.0, 1, 1), profile(2, 0.5, 1, 1)],
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);

        engine.reset(entity);
        let gen = engine.world.get::<&Generator>(entity).unwrap();
        // The unconditional profile fired on the very first pass.
        assert_eq!(gen.profiles[0].spawned.len(), 1);
    }

    #[test]
    fn event_gate_disable_commits_on_second_tick() {
        let def = GeneratorDef {
            max_create: 2,
            gate: GateMode::Event {
                name: "raid_season".to_string(),
            },
            end_policy: DestructionPolicy::Destroy,
            profiles: vec![profile(1, 1.0, 0, 2)],
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);
        engine.events.set_event("raid_season", true, true);

        // Cold start: two observations bring the generator up.
        engine.heartbeat(entity);
        engine.heartbeat(entity);
        engine.regenerate(entity);
        assert_eq!(engine.spawned_count(entity), 2);
        let spawned_before: Vec<Entity> = {
            let gen = engine.world.get::<&Generator>(entity).unwrap();
            gen.profiles[0].spawned.keys().copied().collect()
        };

        // Event stops: tick 1 arms only, bookkeeping intact.
        engine.events.set_event("raid_season", true, false);
        engine.heartbeat(entity);
        assert_eq!(engine.spawned_count(entity), 2);

        // Tick 2 commits: disabled, end policy applied, all cleared.
        engine.heartbeat(entity);
        assert!(engine.world.get::<&Generator>(entity).unwrap().disabled);
        assert_eq!(engine.current_create(entity), 0);
        assert_eq!(engine.spawned_count(entity), 0);
        for e in spawned_before {
            assert!(!engine.world.contains(e));
        }
    }

    #[test]
    fn unknown_entity_notification_is_no_op() {
        let def = GeneratorDef {
            init_create: 1,
            max_create: 1,
            profiles: vec![profile(1, 1.0, 1, 1)],
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);
        engine.reset(entity);

        let stranger = engine.world.spawn(());
        assert!(!engine.notify_removed(stranger, RemovalReason::Destroyed));
        assert_eq!(engine.current_create(entity), 1);
    }

    #[test]
    fn notification_releases_capacity_for_a_future_topup() {
        let def = GeneratorDef {
            init_create: 1,
            max_create: 1,
            profiles: vec![profile(1, 1.0, 1, 1)],
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);
        engine.reset(entity);

        let spawned: Vec<Entity> = {
            let gen = engine.world.get::<&Generator>(entity).unwrap();
            gen.profiles[0].spawned.keys().copied().collect()
        };
        assert!(engine.notify_removed(spawned[0], RemovalReason::Killed));
        // Idempotent: a second call does not double-release.
        assert!(!engine.notify_removed(spawned[0], RemovalReason::Killed));
        assert_eq!(engine.current_create(entity), 0);

        engine.regenerate(entity);
        assert_eq!(engine.current_create(entity), 1);
        assert_eq!(engine.tracked_total(entity), 1);
    }

    #[test]
    fn owner_death_applies_death_policy() {
        let def = GeneratorDef {
            init_create: 1,
            max_create: 1,
            death_policy: DestructionPolicy::Kill,
            profiles: vec![profile(1, 1.0, 1, 1)],
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);
        engine.reset(entity);
        let spawned: Vec<Entity> = {
            let gen = engine.world.get::<&Generator>(entity).unwrap();
            gen.profiles[0].spawned.keys().copied().collect()
        };

        engine.on_owner_death(entity);
        assert_eq!(engine.current_create(entity), 0);
        // Kill leaves the creature as a corpse.
        assert!(engine.world.contains(spawned[0]));
        use crate::components::{Creature, Dead};
        assert_eq!(engine.world.get::<&Creature>(spawned[0]).unwrap().health, 0.0);
        assert!(engine.world.get::<&Dead>(spawned[0]).is_ok());
    }

    #[test]
    fn scheduled_loop_brings_a_cold_generator_up() {
        let def = GeneratorDef {
            init_create: 2,
            max_create: 3,
            profiles: vec![profile(1, 0.6, 1, 2), profile(2, 1.0, 1, 1)],
            heartbeat_secs: 1.0,
            regen_secs: 2.0,
            initial_delay_secs: 1.0,
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);

        // Drive the cooperative loop; heartbeats debounce the gate open,
        // the deferred first spawn primes, regen tops up.
        for _ in 0..40 {
            engine.update(0.5);
            assert!(engine.current_create(entity) <= 3);
            assert_eq!(engine.tracked_total(entity), engine.current_create(entity));
        }
        assert!(!engine.world.get::<&Generator>(entity).unwrap().disabled);
        assert!(engine.spawned_count(entity) >= 2);
    }

    #[test]
    fn zero_heartbeat_definition_does_not_stall_update() {
        let def = GeneratorDef {
            heartbeat_secs: 0.0,
            regen_secs: 0.0,
            ..Default::default()
        };
        let (mut engine, _entity) = engine_with(def);

        // Without cadence clamping this drain would never terminate.
        engine.update(1.0);
        assert_eq!(engine.generator_count(), 1);
    }

    #[test]
    fn disable_before_deferred_first_spawn_cancels_priming() {
        let def = GeneratorDef {
            init_create: 2,
            max_create: 2,
            gate: GateMode::Event {
                name: "raid_season".to_string(),
            },
            end_policy: DestructionPolicy::Destroy,
            profiles: vec![profile(1, 1.0, 2, 2)],
            heartbeat_secs: 1.0,
            initial_delay_secs: 5.0,
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);
        engine.events.set_event("raid_season", true, true);

        // Two heartbeats commit enable; first spawn is deferred 5 seconds.
        engine.update(1.0);
        engine.update(1.0);
        assert!(!engine.world.get::<&Generator>(entity).unwrap().disabled);
        assert_eq!(engine.current_create(entity), 0);

        // Event stops; disable commits before the deferral elapses.
        engine.events.set_event("raid_season", true, false);
        engine.update(1.0);
        engine.update(1.0);
        assert!(engine.world.get::<&Generator>(entity).unwrap().disabled);

        // Past the deferred due time: the task falls through, no priming.
        engine.update(5.0);
        assert!(engine.world.get::<&Generator>(entity).unwrap().disabled);
        assert_eq!(engine.current_create(entity), 0);
        assert_eq!(engine.spawned_count(entity), 0);
    }

    #[test]
    fn despawned_generator_tasks_fall_through() {
        let def = GeneratorDef {
            heartbeat_secs: 1.0,
            ..Default::default()
        };
        let (mut engine, entity) = engine_with(def);
        let _ = engine.world.despawn(entity);

        // Queued heartbeat must be guarded by the existence check.
        engine.update(5.0);
        assert_eq!(engine.generator_count(), 0);
    }
}
