pub mod evaluation;
pub mod finalize;
