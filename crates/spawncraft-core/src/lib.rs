//! Spawncraft Core - Spawn Scheduling Engine
//!
//! An ECS-based engine for "generator" entities: world objects that
//! procedurally create and retire other entities over time under capacity,
//! probability, and real-time/event gating constraints.
//!
//! # Architecture
//!
//! The engine uses an Entity Component System via `hecs`:
//! - **Entities**: generators and the entities they spawn
//! - **Components**: pure data (Generator, SpawnProfile data, SpawnedBy, Creature)
//! - **Systems**: selection, materialization, gating, destruction, notification
//!
//! All generator state is owned by its entity's `Generator` component and
//! mutated only inside the engine's single-threaded tick context.
//!
//! # Example
//!
//! ```rust,no_run
//! use spawncraft_core::prelude::*;
//! use spawncraft_core::generation::GeneratorDef;
//!
//! let mut engine = SimulationEngine::new();
//!
//! // Build a generator from its definition
//! let def = GeneratorDef::default();
//! let _generator = engine.add_generator(def);
//!
//! // Run the tick loop
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod engine;
pub mod generation;
pub mod persistence;
pub mod scheduler;
pub mod services;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::SimulationEngine;
    pub use crate::services::{EventCalendar, TemplateCatalog};
    pub use spawncraft_logic::policy::DestructionPolicy;
}
