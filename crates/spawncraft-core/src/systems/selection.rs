//! Probability selection: turning RNG rolls into queued spawn credits.
//!
//! Two entry points share the band math: `select_init` loops until the init
//! bounds are satisfied (priming a cold or freshly enabled generator), while
//! `select_max` performs exactly one roll and one pass (steady-state
//! top-ups). Capacity is reserved at enqueue time, so every credit counted
//! here is already held against `current_create`.

use spawncraft_logic::bands::{adjusted_total, select_pass, BandEntry};
use spawncraft_logic::constants::SELECT_PASS_LIMIT;
use spawncraft_logic::counts;

use crate::components::{Generator, PendingSpawn};
use crate::services::RollSource;

/// Which bound a selection run works toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectGoal {
    Init,
    Max,
}

/// Prime a generator toward its init bounds. Returns credits enqueued.
///
/// Loops one roll-and-pass at a time until a stop condition holds. The loop
/// is capped: a configuration whose bands never cover the rolled value
/// (placeholder-heavy lists) would otherwise spin, so after
/// `SELECT_PASS_LIMIT` passes the run exits with a warning.
pub fn select_init<R: RollSource + ?Sized>(generator: &mut Generator, rolls: &mut R, now: f64) -> u32 {
    check_drift(generator);

    let mut enqueued = 0;
    let mut passes = 0;
    while !stop_reached(generator, SelectGoal::Init) {
        if passes >= SELECT_PASS_LIMIT {
            log::warn!(
                "select_init: pass limit ({}) hit with stop conditions unmet; \
                 check profile probabilities",
                SELECT_PASS_LIMIT
            );
            break;
        }
        passes += 1;

        let fired = run_pass(generator, rolls, SelectGoal::Init, now);
        enqueued += fired;
        if fired == 0 && !can_make_progress(generator, SelectGoal::Init) {
            break;
        }
    }
    enqueued
}

/// One steady-state top-up: exactly one roll, one pass. Returns credits
/// enqueued.
pub fn select_max<R: RollSource + ?Sized>(generator: &mut Generator, rolls: &mut R, now: f64) -> u32 {
    check_drift(generator);

    if stop_reached(generator, SelectGoal::Max) {
        return 0;
    }
    run_pass(generator, rolls, SelectGoal::Max, now)
}

/// Stop conditions: aggregate bound reached, or every profile has reached
/// the applicable per-profile bound.
fn stop_reached(generator: &Generator, goal: SelectGoal) -> bool {
    match goal {
        SelectGoal::Init => {
            counts::init_satisfied(generator.current_create, generator.init_create)
                || generator.all_init_spawned()
                || generator.all_max_spawned()
        }
        SelectGoal::Max => generator.max_reached() || generator.all_max_spawned(),
    }
}

/// Whether another pass could still enqueue anything: some profile must have
/// a band to hit. Used to break out of fruitless priming loops early.
fn can_make_progress(generator: &Generator, goal: SelectGoal) -> bool {
    adjusted_total(&band_entries(generator, goal)) > 0.0
}

fn exhausted(generator: &Generator, index: usize, goal: SelectGoal) -> bool {
    let profile = &generator.profiles[index];
    match goal {
        SelectGoal::Init => profile.init_spawned() || profile.max_spawned(generator.max_create),
        SelectGoal::Max => profile.max_spawned(generator.max_create),
    }
}

fn band_entries(generator: &Generator, goal: SelectGoal) -> Vec<BandEntry> {
    (0..generator.profiles.len())
        .map(|i| BandEntry {
            probability: generator.profiles[i].probability,
            placeholder: generator.profiles[i].is_placeholder(),
            maxed: exhausted(generator, i, goal),
        })
        .collect()
}

/// Draw one roll, walk the profile list, enqueue credits for every firing
/// profile. Stop conditions are re-checked between firings so a pass never
/// overshoots an aggregate bound.
fn run_pass<R: RollSource + ?Sized>(
    generator: &mut Generator,
    rolls: &mut R,
    goal: SelectGoal,
    now: f64,
) -> u32 {
    let entries = band_entries(generator, goal);
    let total = adjusted_total(&entries);
    let roll = if total > 0.0 {
        rolls.roll(0.0, total)
    } else {
        0.0
    };

    let outcome = select_pass(&entries, roll);
    let mut enqueued = 0;
    for index in outcome.fired {
        if stop_reached(generator, goal) {
            break;
        }
        enqueued += enqueue(generator, index, goal, now);
    }
    enqueued
}

/// Reserve `min(profile remaining, generator remaining)` credits for one
/// firing profile.
fn enqueue(generator: &mut Generator, index: usize, goal: SelectGoal, now: f64) -> u32 {
    let generator_remaining = match goal {
        SelectGoal::Init => generator.remaining_to_init(),
        SelectGoal::Max => generator.remaining_to_max(),
    };
    let profile_remaining = {
        let profile = &generator.profiles[index];
        match goal {
            SelectGoal::Init => profile.remaining_to_init(),
            SelectGoal::Max => profile.remaining_to_max(generator.max_create),
        }
    };

    let amount = counts::batch_size(profile_remaining, generator_remaining);
    let profile = &mut generator.profiles[index];
    for _ in 0..amount {
        profile.pending.push_back(PendingSpawn { queued_at: now });
    }
    generator.current_create += amount;
    amount
}

/// Drifted counters are logged but never halt the generator; `>=` stop
/// checks self-correct on the next evaluation.
fn check_drift(generator: &Generator) {
    if generator.max_create != 0 && generator.current_create > generator.max_create {
        log::warn!(
            "generator counter drift: current_create {} above max_create {}",
            generator.current_create,
            generator.max_create
        );
    }
}
