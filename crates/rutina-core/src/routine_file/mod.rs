//! Routine definition files.
//!
//! A TOML file describing a routine's details and days. Files are parsed
//! and validated here, replayed through a [`crate::WizardController`] to
//! create or update a routine, and rendered back from stored routines.

pub mod export;
pub mod format;
pub mod parser;
pub mod replay;

pub use export::{export_routine_file, render_routine_file};
pub use format::{DayToml, ExerciseToml, RoutineFile, RoutineMeta};
pub use parser::{RoutineFileError, parse_routine_file};
pub use replay::{ReplayError, replay_routine_file, resolve_exercise};
