// Playing XI prediction: pool normalisation, per-player scoring and
// quota-driven greedy selection.

pub mod params;
pub mod scoring;
pub mod selection;
pub mod zscore;

pub use params::{Format, Pitch, SelectionParams, Strategy};
pub use selection::{select_team, Pick, SelectionResult};
