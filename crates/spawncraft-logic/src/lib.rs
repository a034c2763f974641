//! Pure spawn-scheduling logic for Spawncraft.
//!
//! This crate contains all scheduling math that is independent of any ECS,
//! RNG implementation, or runtime. Functions take plain data and return
//! results, making them unit-testable and portable between the engine crate
//! and the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bands`] | Cumulative probability-band computation and single-pass selection |
//! | [`constants`] | Sentinel values, default tick cadences, loop caps |
//! | [`counts`] | Init/max capacity predicates and enqueue batch sizing |
//! | [`gate`] | Real-time window checks and the two-observation gate latch |
//! | [`policy`] | Destruction-policy variants and per-entity teardown actions |

pub mod bands;
pub mod constants;
pub mod counts;
pub mod gate;
pub mod policy;
