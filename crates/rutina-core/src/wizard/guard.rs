//! Step guards and the validation failures they report.

use thiserror::Error;

use super::RoutineDetails;
use crate::model::TrainingDay;

/// A rejected wizard operation. Names the offending field or day so the
/// caller can point the operator at it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("routine name must not be empty")]
    EmptyName,

    #[error("no client selected")]
    NoClient,

    #[error("training days must be between 1 and {max}, got {value}")]
    DaysCountOutOfRange { value: u32, max: usize },

    #[error("duration must be at least one week")]
    InvalidDuration,

    #[error("day {} has no exercises", .index + 1)]
    EmptyDay { index: usize },

    #[error("day index {index} out of range (routine has {len} days)")]
    DayOutOfRange { index: usize, len: usize },

    #[error("exercise index {index} out of range (day has {len} exercises)")]
    ExerciseOutOfRange { index: usize, len: usize },

    #[error("no exercise is open for editing")]
    NoEditTarget,

    #[error("day {} cannot be copied onto itself", .index + 1)]
    CopyToSelf { index: usize },

    #[error("day {} has no exercises to copy", .index + 1)]
    EmptyCopySource { index: usize },

    #[error("no target days selected for copy")]
    NoCopyTargets,

    #[error("exercise {0:?} is not in the catalog")]
    UnknownExercise(String),
}

impl ValidationError {
    /// Day the operator should be shown, if the failure concerns one.
    pub fn day_index(&self) -> Option<usize> {
        match self {
            Self::EmptyDay { index }
            | Self::CopyToSelf { index }
            | Self::EmptyCopySource { index } => Some(*index),
            _ => None,
        }
    }
}

/// Details → Planning guard.
pub fn validate_details(details: &RoutineDetails, max_days: usize) -> Result<(), ValidationError> {
    if details.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if details.client_id.is_none() {
        return Err(ValidationError::NoClient);
    }
    validate_days_count(details.days_count, max_days)?;
    if details.duration_weeks == 0 {
        return Err(ValidationError::InvalidDuration);
    }
    Ok(())
}

pub fn validate_days_count(value: u32, max_days: usize) -> Result<(), ValidationError> {
    if value == 0 || value as usize > max_days {
        return Err(ValidationError::DaysCountOutOfRange {
            value,
            max: max_days,
        });
    }
    Ok(())
}

/// Planning → Review guard. Stops at the first day without exercises.
pub fn validate_planning(days: &[TrainingDay]) -> Result<(), ValidationError> {
    match days.iter().position(|day| day.exercises().is_empty()) {
        Some(index) => Err(ValidationError::EmptyDay { index }),
        None => Ok(()),
    }
}
