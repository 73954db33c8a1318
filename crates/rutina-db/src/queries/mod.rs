//! Query functions, one module per table group.

pub mod clients;
pub mod exercises;
pub mod routines;
pub mod training_days;
