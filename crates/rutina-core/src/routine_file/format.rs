//! Serde types for routine definition files.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level structure of a routine file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutineFile {
    pub routine: RoutineMeta,
    #[serde(default)]
    pub days: Vec<DayToml>,
}

/// Routine details in `[routine]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutineMeta {
    /// Set once the routine has been created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub name: String,
    /// Client the routine is assigned to.
    pub client: Uuid,
    #[serde(default)]
    pub objective: String,
    #[serde(default = "default_duration_weeks")]
    pub duration_weeks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One `[[days]]` entry. Lists either `exercises` or `copy_from`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DayToml {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub muscle_groups: Vec<String>,
    /// 1-based number of an earlier day whose exercises are copied here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_from: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exercises: Vec<ExerciseToml>,
}

/// One `[[days.exercises]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseToml {
    /// Catalog id, or exercise name matched case-insensitively.
    pub exercise: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub superset: bool,
}

impl ExerciseToml {
    pub fn new(exercise: impl Into<String>) -> Self {
        Self {
            exercise: exercise.into(),
            sets: None,
            reps: None,
            rest: None,
            notes: None,
            superset: false,
        }
    }
}

fn default_duration_weeks() -> u32 {
    4
}
