//! Per-entity delayed continuations on a shared tick driver.
//!
//! Generators schedule their own heartbeat and regeneration callbacks as
//! tasks on a due-time heap that the engine drains inside `update()`. Tasks
//! are never truly cancelled: whoever pops a task re-checks that the owning
//! entity still exists and still wants it (cancellation-by-guard), so a
//! despawned generator's queued callbacks fall through harmlessly.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hecs::Entity;

/// Kinds of scheduled generator callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Generic per-entity tick: gate evaluation and startup.
    Heartbeat,
    /// Generator-specific periodic tick: select + materialize.
    Regenerate,
    /// Deferred first materialization after an enable commit.
    FirstSpawn,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTask {
    due: f64,
    seq: u64,
    entity: Entity,
    kind: TaskKind,
}

// Min-heap ordering by due time, then insertion order for ties.
impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledTask {}

/// Due-time task queue drained by the engine each update.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: BinaryHeap<ScheduledTask>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a callback for `entity` at absolute sim time `due` (seconds).
    pub fn schedule(&mut self, due: f64, entity: Entity, kind: TaskKind) {
        let seq = self.seq;
        self.seq += 1;
        self.tasks.push(ScheduledTask {
            due,
            seq,
            entity,
            kind,
        });
    }

    /// Pop the next task due at or before `now`, oldest first among ties.
    pub fn pop_due(&mut self, now: f64) -> Option<(Entity, TaskKind)> {
        if self.tasks.peek().map(|t| t.due <= now).unwrap_or(false) {
            self.tasks.pop().map(|t| (t.entity, t.kind))
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
