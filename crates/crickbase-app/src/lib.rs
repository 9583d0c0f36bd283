// Application services shared by the command-line front end: player
// management, team prediction and logging setup.

pub mod logging;
pub mod players;
pub mod predict;

pub use predict::{predict_team, PredictError, PredictRequest};
