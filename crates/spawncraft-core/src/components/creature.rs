//! Components carried by materialized entities.

use serde::{Deserialize, Serialize};

use super::spawn::TemplateId;

/// Which template a materialized entity was created from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TemplateRef(pub TemplateId);

/// Living-creature data. Entities without this component are objects and
/// are destroyed outright by the Kill policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Creature {
    pub health: f32,
    pub max_health: f32,
}

impl Creature {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// Marker for a creature that has died in place; corpse handling is an
/// external concern.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Dead;
