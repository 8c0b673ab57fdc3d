//! Core engine: the seed/perturb odds update batch job.

pub mod report;
pub mod simulator;
pub mod updater;

pub use report::{EventUpdate, UpdateKind, UpdateReport};
pub use updater::OddsUpdater;
