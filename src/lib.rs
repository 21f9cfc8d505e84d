// ldasweep: LDA topic model evaluation
//
// This is the library root. Each module corresponds to a stage of the
// evaluation pipeline: data loading, model fitting, scoring, reporting.

pub mod config;
pub mod data;
pub mod evaluate;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod topics;
