//! Systems - scheduling logic that operates on generator components

mod destruction;
mod gate;
mod materialize;
mod notify;
mod selection;

pub use destruction::*;
pub use gate::*;
pub use materialize::*;
pub use notify::*;
pub use selection::*;
