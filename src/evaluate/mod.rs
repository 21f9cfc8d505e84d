// Evaluation: parameter grids, metrics, the parallel sweep, and model selection.

pub mod linalg;
pub mod metrics;
pub mod params;
pub mod results;
pub mod sweep;
