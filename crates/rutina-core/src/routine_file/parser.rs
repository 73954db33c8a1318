//! Routine file parser with validation.
//!
//! Parses a routine file into a [`RoutineFile`] and validates:
//! - The routine has a name, a positive duration and 1 to 7 days.
//! - Each day lists either exercises or `copy_from`, not both or neither.
//! - `copy_from` names an earlier day that lists its own exercises.
//! - No exercise appears twice within a day, and sets are positive.

use std::collections::HashSet;

use thiserror::Error;

use super::format::RoutineFile;
use crate::planning::MAX_DAYS;

/// Errors that can occur during routine file parsing and validation.
/// Day numbers in messages are 1-based.
#[derive(Debug, Error)]
pub enum RoutineFileError {
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("routine name must not be empty")]
    EmptyName,

    #[error("duration_weeks must be at least 1")]
    InvalidDuration,

    #[error("routine must contain at least one day")]
    NoDays,

    #[error("routine has {count} days, at most {max} allowed")]
    TooManyDays { count: usize, max: usize },

    #[error("day {day} lists neither exercises nor copy_from")]
    EmptyDay { day: usize },

    #[error("day {day} lists both exercises and copy_from")]
    ExercisesAndCopy { day: usize },

    #[error("day {day} copies from day {from}, which is not an earlier day")]
    CopyFromInvalid { day: usize, from: u32 },

    #[error("day {day} copies from day {from}, which has no exercises of its own")]
    CopyFromCopy { day: usize, from: u32 },

    #[error("day {day} lists exercise {exercise:?} more than once")]
    DuplicateExercise { day: usize, exercise: String },

    #[error("day {day}: exercise {exercise:?} must have at least one set")]
    InvalidSets { day: usize, exercise: String },
}

/// Parse and validate a routine file.
pub fn parse_routine_file(content: &str) -> Result<RoutineFile, RoutineFileError> {
    let file: RoutineFile = toml::from_str(content)?;
    validate(&file)?;
    Ok(file)
}

fn validate(file: &RoutineFile) -> Result<(), RoutineFileError> {
    if file.routine.name.trim().is_empty() {
        return Err(RoutineFileError::EmptyName);
    }
    if file.routine.duration_weeks == 0 {
        return Err(RoutineFileError::InvalidDuration);
    }
    if file.days.is_empty() {
        return Err(RoutineFileError::NoDays);
    }
    if file.days.len() > MAX_DAYS {
        return Err(RoutineFileError::TooManyDays {
            count: file.days.len(),
            max: MAX_DAYS,
        });
    }

    for (idx, day) in file.days.iter().enumerate() {
        let number = idx + 1;
        match (day.exercises.is_empty(), day.copy_from) {
            (true, None) => return Err(RoutineFileError::EmptyDay { day: number }),
            (false, Some(_)) => return Err(RoutineFileError::ExercisesAndCopy { day: number }),
            (true, Some(from)) => {
                if from == 0 || from as usize >= number {
                    return Err(RoutineFileError::CopyFromInvalid { day: number, from });
                }
                if file.days[from as usize - 1].exercises.is_empty() {
                    return Err(RoutineFileError::CopyFromCopy { day: number, from });
                }
            }
            (false, None) => {}
        }

        let mut seen = HashSet::new();
        for ex in &day.exercises {
            if !seen.insert(ex.exercise.trim().to_lowercase()) {
                return Err(RoutineFileError::DuplicateExercise {
                    day: number,
                    exercise: ex.exercise.clone(),
                });
            }
            if ex.sets == Some(0) {
                return Err(RoutineFileError::InvalidSets {
                    day: number,
                    exercise: ex.exercise.clone(),
                });
            }
        }
    }

    Ok(())
}
