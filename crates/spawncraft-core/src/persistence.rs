//! Save/Load functionality for persisting scheduler state
//!
//! Uses bincode for binary serialization. Generator definitions are
//! extracted from the live components on save; entity ids, pending queues,
//! and spawn registries are deliberately not persisted; generators come
//! back cold and re-prime through their normal gate debounce on load.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::{Generator, Placement, Position, Transform};
use crate::generation::{GeneratorDef, ProfileDef};
use crate::services::EventCalendar;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the scheduler state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in seconds
    pub sim_time: f64,
    /// Time scale
    pub time_scale: f32,
    /// Epoch anchor for real-time gates
    pub epoch_offset: i64,
    /// World-event state
    pub events: EventCalendar,
    /// Generator definitions reconstructed from live components
    pub generators: Vec<GeneratorDef>,
}

/// Extract a definition from each live generator.
fn extract_defs(world: &World) -> Vec<GeneratorDef> {
    let mut defs = Vec::new();
    for (entity, gen) in world.query::<&Generator>().iter() {
        let position = world
            .get::<&Position>(entity)
            .map(|p| p.transform)
            .unwrap_or_else(|_| Transform::default());

        let profiles = gen
            .profiles
            .iter()
            .map(|p| ProfileDef {
                template: p.template.0,
                probability: p.probability,
                init_count: p.init_count,
                max_count: p.max_count,
                placement: match p.placement {
                    Placement::Absolute(transform) => Some(transform),
                    Placement::Owner => None,
                },
            })
            .collect();

        defs.push(GeneratorDef {
            label: String::new(),
            position,
            init_create: gen.init_create,
            max_create: gen.max_create,
            gate: gen.gate.clone(),
            end_policy: gen.end_policy,
            death_policy: gen.death_policy,
            profiles,
            linked: Vec::new(),
            heartbeat_secs: gen.heartbeat_secs,
            regen_secs: gen.regen_secs,
            initial_delay_secs: gen.initial_delay_secs,
        });
    }
    defs
}

/// Save the scheduler state to a writer
pub fn save_simulation<W: Write>(
    writer: W,
    world: &World,
    sim_time: f64,
    time_scale: f32,
    epoch_offset: i64,
    events: &EventCalendar,
) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        sim_time,
        time_scale,
        epoch_offset,
        events: events.clone(),
        generators: extract_defs(world),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load scheduler state from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<LoadedSimulation, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    Ok(LoadedSimulation {
        sim_time: save_data.sim_time,
        time_scale: save_data.time_scale,
        epoch_offset: save_data.epoch_offset,
        events: save_data.events,
        generators: save_data.generators,
    })
}

/// Result of loading a saved scheduler state
pub struct LoadedSimulation {
    pub sim_time: f64,
    pub time_scale: f32,
    pub epoch_offset: i64,
    pub events: EventCalendar,
    pub generators: Vec<GeneratorDef>,
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(f, "Save version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for SaveError {}
