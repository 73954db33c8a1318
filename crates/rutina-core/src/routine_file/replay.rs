//! Drive a wizard session from a routine file.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use super::format::{ExerciseToml, RoutineFile};
use crate::model::CatalogExercise;
use crate::planning::AssignmentPatch;
use crate::wizard::{WizardController, WizardError, WizardStep};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("day {day}: exercise {exercise:?} not found in catalog")]
    UnknownExercise { day: usize, exercise: String },

    #[error("day {day}: exercise {exercise:?} is already assigned")]
    AlreadyAssigned { day: usize, exercise: String },

    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// Find a catalog entry by id, or by name ignoring case.
pub fn resolve_exercise<'a>(catalog: &'a [CatalogExercise], reference: &str) -> Option<&'a CatalogExercise> {
    let reference = reference.trim();
    catalog.iter().find(|e| e.id == reference).or_else(|| {
        let wanted = reference.to_lowercase();
        catalog.iter().find(|e| e.name.to_lowercase() == wanted)
    })
}

/// Replay `file` through `wizard`, ending at the Review step.
///
/// The wizard must be at the Details step with its catalog loaded. Days
/// already present (when editing) are cleared and rebuilt from the file.
/// Days with `copy_from` are filled last, one duplication per source day.
pub fn replay_routine_file(wizard: &mut WizardController, file: &RoutineFile) -> Result<(), ReplayError> {
    let meta = &file.routine;
    wizard.set_name(meta.name.clone())?;
    wizard.set_client(Some(meta.client))?;
    wizard.set_objective(meta.objective.clone())?;
    wizard.set_duration_weeks(meta.duration_weeks)?;
    wizard.set_notes(meta.notes.clone().unwrap_or_default())?;
    wizard.set_days_count(file.days.len() as u32)?;
    wizard.next()?;

    let mut copies: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, day) in file.days.iter().enumerate() {
        wizard.focus_day(idx)?;
        clear_focused_day(wizard)?;

        for group in &day.muscle_groups {
            wizard.toggle_muscle_group(group)?;
        }
        match day.copy_from {
            Some(from) => copies.entry(from as usize - 1).or_default().push(idx),
            None => {
                for ex in &day.exercises {
                    add_exercise(wizard, idx, ex)?;
                }
            }
        }
    }

    for (source, targets) in copies {
        wizard.focus_day(source)?;
        for target in targets {
            wizard.toggle_copy_target(target)?;
        }
        wizard.duplicate_focused_day()?;
    }

    wizard.next()?;
    debug!(name = %meta.name, days = file.days.len(), step = %WizardStep::Review, "routine file replayed");
    Ok(())
}

fn clear_focused_day(wizard: &mut WizardController) -> Result<(), WizardError> {
    let day = &wizard.days()[wizard.focused_day()];
    let groups = day.muscle_groups().to_vec();
    let assigned = day.exercises().len();
    for group in groups {
        wizard.toggle_muscle_group(&group)?;
    }
    for _ in 0..assigned {
        wizard.remove_assignment(0)?;
    }
    Ok(())
}

fn add_exercise(wizard: &mut WizardController, day: usize, ex: &ExerciseToml) -> Result<(), ReplayError> {
    let id = resolve_exercise(&wizard.reference().catalog, &ex.exercise)
        .map(|e| e.id.clone())
        .ok_or_else(|| ReplayError::UnknownExercise {
            day: day + 1,
            exercise: ex.exercise.clone(),
        })?;
    if wizard.days()[day].is_assigned(&id) {
        return Err(ReplayError::AlreadyAssigned {
            day: day + 1,
            exercise: ex.exercise.clone(),
        });
    }
    wizard.toggle_exercise(&id)?;

    let index = wizard.days()[day].exercises().len() - 1;
    let mut patch = AssignmentPatch::default();
    if let Some(sets) = ex.sets {
        patch = patch.sets(sets.to_string());
    }
    if let Some(reps) = &ex.reps {
        patch = patch.reps(reps.clone());
    }
    if let Some(rest) = &ex.rest {
        patch = patch.rest(rest.clone());
    }
    if let Some(notes) = &ex.notes {
        patch = patch.notes(notes.clone());
    }
    if !patch.is_empty() {
        wizard.open_edit(index)?;
        wizard.apply_edit(&patch)?;
    }
    if ex.superset {
        wizard.toggle_superset(index)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> CatalogExercise {
        CatalogExercise {
            id: id.to_owned(),
            name: name.to_owned(),
            muscle_group: "Pecho".to_owned(),
            image_url: None,
            video_url: None,
            is_global: false,
        }
    }

    #[test]
    fn resolves_by_id_then_name() {
        let catalog = vec![entry("a1", "Press banca"), entry("b2", "Aperturas")];
        assert_eq!(resolve_exercise(&catalog, "b2").map(|e| e.id.as_str()), Some("b2"));
        assert_eq!(
            resolve_exercise(&catalog, " press BANCA ").map(|e| e.id.as_str()),
            Some("a1")
        );
        assert!(resolve_exercise(&catalog, "Remo").is_none());
    }

    fn wizard() -> WizardController {
        let mut w = WizardController::new(uuid::Uuid::new_v4(), crate::WizardConfig::default());
        w.set_reference_data(crate::wizard::ReferenceData {
            catalog: vec![entry("a1", "Press banca"), entry("b2", "Aperturas"), entry("c3", "Fondos")],
            ..Default::default()
        });
        w
    }

    fn file(content: &str) -> RoutineFile {
        let header = "[routine]\nname = \"Pecho\"\nclient = \"6f1c2a7e-1f7a-4a52-9c1e-1d2f3a4b5c6d\"\n";
        crate::routine_file::parse_routine_file(&format!("{header}{content}")).expect("valid file")
    }

    #[test]
    fn replays_exercises_parameters_and_copies() {
        let mut w = wizard();
        let f = file(
            r#"
[[days]]
muscle_groups = ["Pecho"]
[[days.exercises]]
exercise = "press banca"
sets = 5
rest = "2m"
[[days.exercises]]
exercise = "c3"
superset = true

[[days]]
muscle_groups = ["Hombro"]
copy_from = 1
"#,
        );
        replay_routine_file(&mut w, &f).expect("replay");

        assert_eq!(w.step(), WizardStep::Review);
        let days = w.days();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].exercises()[0].exercise_id, "a1");
        assert_eq!(days[0].exercises()[0].sets, 5);
        assert_eq!(days[0].exercises()[0].rest, "2m");
        assert_eq!(days[0].exercises()[0].reps, "10-12");
        assert!(days[0].exercises()[1].is_superset);
        assert_eq!(days[1].exercises(), days[0].exercises());
        assert_eq!(days[1].muscle_groups(), ["Hombro"]);
    }

    #[test]
    fn unknown_exercise_names_the_day() {
        let mut w = wizard();
        let f = file("[[days]]\n[[days.exercises]]\nexercise = \"Remo\"\n");
        let err = replay_routine_file(&mut w, &f).unwrap_err();
        assert!(matches!(err, ReplayError::UnknownExercise { day: 1, ref exercise } if exercise == "Remo"));
    }

    #[test]
    fn same_exercise_by_id_and_name_is_rejected() {
        let mut w = wizard();
        let f = file(
            "[[days]]\n[[days.exercises]]\nexercise = \"a1\"\n[[days.exercises]]\nexercise = \"Press banca\"\n",
        );
        let err = replay_routine_file(&mut w, &f).unwrap_err();
        assert!(matches!(err, ReplayError::AlreadyAssigned { day: 1, .. }));
    }
}
