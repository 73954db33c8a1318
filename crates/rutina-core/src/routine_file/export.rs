//! Render stored routines as routine files.

use super::format::{DayToml, ExerciseToml, RoutineFile, RoutineMeta};
use crate::store::RoutineWithDays;

/// Routine file equivalent of a stored routine.
///
/// Exercises are referenced by catalog id with every parameter spelled
/// out, so replaying the file reproduces the routine.
pub fn export_routine_file(routine: &RoutineWithDays) -> RoutineFile {
    let header = &routine.header;
    RoutineFile {
        routine: RoutineMeta {
            id: Some(routine.id),
            name: header.name.clone(),
            client: header.client_id,
            objective: header.objective.clone(),
            duration_weeks: header.duration_weeks,
            notes: header.notes.clone(),
        },
        days: routine
            .days
            .iter()
            .map(|day| DayToml {
                muscle_groups: day.muscle_groups().to_vec(),
                copy_from: None,
                exercises: day
                    .exercises()
                    .iter()
                    .map(|a| ExerciseToml {
                        exercise: a.exercise_id.clone(),
                        sets: Some(a.sets),
                        reps: Some(a.reps.clone()),
                        rest: Some(a.rest.clone()),
                        notes: a.notes.clone(),
                        superset: a.is_superset,
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Serialize a routine file to TOML text.
pub fn render_routine_file(file: &RoutineFile) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(file)
}
