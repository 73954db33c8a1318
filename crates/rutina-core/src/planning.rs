//! Planning engine: pure transitions over a routine's day list.
//!
//! Every function takes the current days and returns a new list. Nothing
//! here performs I/O, logs, or fails: an out-of-range day or exercise index
//! leaves the input unchanged. After every call `day_number == index + 1`
//! for each day and `order == index` for each assignment.

use std::collections::BTreeSet;

use crate::model::{CatalogExercise, ExerciseAssignment, TrainingDay};

/// Most training days a routine may have (one per weekday).
pub const MAX_DAYS: usize = 7;

/// Fields to overwrite on one assignment. `None` leaves a field untouched.
///
/// `sets` is raw operator input: it is parsed as a positive integer and
/// anything else keeps the assignment's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentPatch {
    pub sets: Option<String>,
    pub reps: Option<String>,
    pub rest: Option<String>,
    /// A blank string clears the notes.
    pub notes: Option<String>,
}

impl AssignmentPatch {
    pub fn sets(mut self, sets: impl Into<String>) -> Self {
        self.sets = Some(sets.into());
        self
    }

    pub fn reps(mut self, reps: impl Into<String>) -> Self {
        self.reps = Some(reps.into());
        self
    }

    pub fn rest(mut self, rest: impl Into<String>) -> Self {
        self.rest = Some(rest.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_none() && self.reps.is_none() && self.rest.is_none() && self.notes.is_none()
    }
}

/// Parse a sets value, falling back to `current` for anything that is not
/// a positive integer.
pub fn parse_sets(input: &str, current: u32) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => current,
    }
}

/// Grow or shrink the day list to `new_count` days.
///
/// Growing appends empty days. Shrinking drops the trailing days together
/// with their assignments. Range checking of `new_count` is the caller's
/// job.
pub fn resize_days(days: &[TrainingDay], new_count: usize) -> Vec<TrainingDay> {
    let mut next: Vec<TrainingDay> = days.iter().take(new_count).cloned().collect();
    while next.len() < new_count {
        next.push(TrainingDay::new(next.len() as u32 + 1));
    }
    renumber(&mut next);
    next
}

/// Add `group` to the day if absent, otherwise remove it.
///
/// Assignments are left alone even when their group is removed. A group
/// removed and added again moves to the end.
pub fn toggle_muscle_group(days: &[TrainingDay], day_index: usize, group: &str) -> Vec<TrainingDay> {
    with_day(days, day_index, |day| {
        let groups = day.muscle_groups_mut();
        match groups.iter().position(|g| g == group) {
            Some(pos) => {
                groups.remove(pos);
            }
            None => groups.push(group.to_owned()),
        }
    })
}

/// Assign `exercise` to the day, or unassign it if already present.
///
/// Unassigning removes every assignment carrying that exercise id, so two
/// toggles always cancel out.
pub fn toggle_exercise(
    days: &[TrainingDay],
    day_index: usize,
    exercise: &CatalogExercise,
) -> Vec<TrainingDay> {
    with_day(days, day_index, |day| {
        if day.is_assigned(&exercise.id) {
            day.exercises_vec_mut()
                .retain(|a| a.exercise_id != exercise.id);
        } else {
            day.exercises_vec_mut()
                .push(ExerciseAssignment::from_catalog(exercise));
        }
    })
}

/// Overwrite the patched fields of one assignment.
pub fn edit_assignment(
    days: &[TrainingDay],
    day_index: usize,
    exercise_index: usize,
    patch: &AssignmentPatch,
) -> Vec<TrainingDay> {
    with_day(days, day_index, |day| {
        let Some(assignment) = day.exercise_mut(exercise_index) else {
            return;
        };
        if let Some(sets) = &patch.sets {
            assignment.sets = parse_sets(sets, assignment.sets);
        }
        if let Some(reps) = &patch.reps {
            assignment.reps = reps.clone();
        }
        if let Some(rest) = &patch.rest {
            assignment.rest = rest.clone();
        }
        if let Some(notes) = &patch.notes {
            assignment.notes = if notes.trim().is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }
    })
}

/// Flip the superset hint of one assignment.
pub fn toggle_superset(days: &[TrainingDay], day_index: usize, exercise_index: usize) -> Vec<TrainingDay> {
    with_day(days, day_index, |day| {
        if let Some(assignment) = day.exercise_mut(exercise_index) {
            assignment.is_superset = !assignment.is_superset;
        }
    })
}

/// Remove one assignment by position.
pub fn remove_assignment(days: &[TrainingDay], day_index: usize, exercise_index: usize) -> Vec<TrainingDay> {
    with_day(days, day_index, |day| {
        let exercises = day.exercises_vec_mut();
        if exercise_index < exercises.len() {
            exercises.remove(exercise_index);
        }
    })
}

/// Move one assignment from position `from` to position `to` within a day.
pub fn move_assignment(days: &[TrainingDay], day_index: usize, from: usize, to: usize) -> Vec<TrainingDay> {
    with_day(days, day_index, |day| {
        let exercises = day.exercises_vec_mut();
        if from < exercises.len() && to < exercises.len() && from != to {
            let moved = exercises.remove(from);
            exercises.insert(to, moved);
        }
    })
}

/// Replace the assignments of every target day with a copy of the source
/// day's assignments.
///
/// Targets keep their muscle groups. The source index is skipped if it
/// appears among the targets, as are out-of-range targets. A source with no
/// assignments leaves everything unchanged.
pub fn duplicate_day(
    days: &[TrainingDay],
    source_index: usize,
    target_indices: &BTreeSet<usize>,
) -> Vec<TrainingDay> {
    let mut next = days.to_vec();
    let Some(source) = days.get(source_index) else {
        return next;
    };
    if source.exercises().is_empty() {
        return next;
    }

    for &target in target_indices {
        if target == source_index {
            continue;
        }
        if let Some(day) = next.get_mut(target) {
            // Clone allocates fresh assignments, so no target shares state
            // with the source or with another target.
            *day.exercises_vec_mut() = source.exercises().to_vec();
            day.restamp_orders();
        }
    }
    next
}

/// Bring externally sourced days into canonical shape: days sorted by
/// their stored number, assignments sorted by their stored order, then both
/// renumbered contiguously.
pub fn normalize_days(mut days: Vec<TrainingDay>) -> Vec<TrainingDay> {
    days.sort_by_key(TrainingDay::day_number);
    for day in &mut days {
        day.exercises_vec_mut().sort_by_key(ExerciseAssignment::order);
    }
    renumber(&mut days);
    days
}

/// Apply `f` to a clone of the day at `day_index` and restamp orders.
fn with_day(
    days: &[TrainingDay],
    day_index: usize,
    f: impl FnOnce(&mut TrainingDay),
) -> Vec<TrainingDay> {
    let mut next = days.to_vec();
    if let Some(day) = next.get_mut(day_index) {
        f(day);
        day.restamp_orders();
    }
    next
}

fn renumber(days: &mut [TrainingDay]) {
    for (idx, day) in days.iter_mut().enumerate() {
        day.set_day_number(idx as u32 + 1);
        day.restamp_orders();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, group: &str) -> CatalogExercise {
        CatalogExercise {
            id: id.to_owned(),
            name: format!("Ejercicio {id}"),
            muscle_group: group.to_owned(),
            image_url: None,
            video_url: None,
            is_global: true,
        }
    }

    fn assert_contiguous(days: &[TrainingDay]) {
        for (d, day) in days.iter().enumerate() {
            assert_eq!(day.day_number() as usize, d + 1, "day number at {d}");
            for (k, a) in day.exercises().iter().enumerate() {
                assert_eq!(a.order() as usize, k, "order at day {d} pos {k}");
            }
        }
    }

    /// Days where day `i` holds `counts[i]` exercises.
    fn filled(counts: &[usize]) -> Vec<TrainingDay> {
        let mut days = resize_days(&[], counts.len());
        for (d, &n) in counts.iter().enumerate() {
            for k in 0..n {
                days = toggle_exercise(&days, d, &entry(&format!("d{d}e{k}"), "Pecho"));
            }
        }
        days
    }

    // -------------------------------------------------------------------
    // resize_days
    // -------------------------------------------------------------------

    #[test]
    fn resize_grows_with_empty_numbered_days() {
        let days = resize_days(&filled(&[1]), 3);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].exercises().len(), 1);
        assert_eq!(days[2].day_number(), 3);
        assert!(days[2].muscle_groups().is_empty());
        assert!(days[2].exercises().is_empty());
        assert_contiguous(&days);
    }

    #[test]
    fn resize_is_idempotent() {
        let start = filled(&[2, 0, 1]);
        for n in 1..=MAX_DAYS {
            let once = resize_days(&start, n);
            assert_eq!(resize_days(&once, n), once, "n = {n}");
        }
    }

    #[test]
    fn resize_preserves_prefix() {
        let start = filled(&[1, 2, 3]);
        for n in 1..=MAX_DAYS {
            for m in 1..n {
                let small = resize_days(&start, m);
                let large = resize_days(&start, n);
                assert_eq!(small[..], large[..m], "m = {m}, n = {n}");
            }
        }
    }

    #[test]
    fn resize_same_count_is_noop() {
        let start = filled(&[1, 1]);
        assert_eq!(resize_days(&start, 2), start);
    }

    #[test]
    fn shrink_discards_trailing_days_for_good() {
        let start = filled(&[1, 2, 3, 1, 2]);
        let shrunk = resize_days(&start, 2);
        assert_eq!(shrunk.len(), 2);
        assert_eq!(shrunk[..], start[..2]);

        let regrown = resize_days(&shrunk, 5);
        for day in &regrown[2..] {
            assert!(day.exercises().is_empty());
        }
    }

    // -------------------------------------------------------------------
    // toggle_muscle_group
    // -------------------------------------------------------------------

    #[test]
    fn toggle_muscle_group_appends_and_removes() {
        let mut days = resize_days(&[], 1);
        days = toggle_muscle_group(&days, 0, "Pecho");
        days = toggle_muscle_group(&days, 0, "Espalda");
        assert_eq!(days[0].muscle_groups(), ["Pecho", "Espalda"]);

        days = toggle_muscle_group(&days, 0, "Pecho");
        assert_eq!(days[0].muscle_groups(), ["Espalda"]);

        // Re-adding moves it to the end.
        days = toggle_muscle_group(&days, 0, "Pecho");
        assert_eq!(days[0].muscle_groups(), ["Espalda", "Pecho"]);
    }

    #[test]
    fn removing_muscle_group_keeps_its_exercises() {
        let mut days = resize_days(&[], 1);
        days = toggle_muscle_group(&days, 0, "Pecho");
        days = toggle_exercise(&days, 0, &entry("press", "Pecho"));
        days = toggle_muscle_group(&days, 0, "Pecho");
        assert!(days[0].muscle_groups().is_empty());
        assert!(days[0].is_assigned("press"));
    }

    // -------------------------------------------------------------------
    // toggle_exercise
    // -------------------------------------------------------------------

    #[test]
    fn toggle_exercise_is_self_inverse() {
        let days = filled(&[2, 1]);
        let ex = entry("nuevo", "Pecho");
        let there = toggle_exercise(&days, 0, &ex);
        assert_eq!(there[0].exercises().len(), 3);
        assert_eq!(toggle_exercise(&there, 0, &ex), days);

        let existing = entry("d0e0", "Pecho");
        let removed = toggle_exercise(&days, 0, &existing);
        assert_eq!(removed[0].exercises().len(), 1);
        assert_contiguous(&removed);
        let back = toggle_exercise(&removed, 0, &existing);
        assert_eq!(back[0].exercises().len(), 2);
        assert_eq!(back[0].exercises()[1].exercise_id, "d0e0");
    }

    #[test]
    fn toggle_exercise_removes_every_duplicate() {
        let ex = entry("press", "Pecho");
        let dup = ExerciseAssignment::from_catalog(&ex);
        let days = vec![TrainingDay::new(1).with_exercises(vec![dup.clone(), dup])];
        let next = toggle_exercise(&days, 0, &ex);
        assert!(next[0].exercises().is_empty());
    }

    #[test]
    fn toggle_exercise_out_of_range_day_is_noop() {
        let days = filled(&[1]);
        assert_eq!(toggle_exercise(&days, 4, &entry("x", "Pecho")), days);
    }

    // -------------------------------------------------------------------
    // edit / remove / move / superset
    // -------------------------------------------------------------------

    #[test]
    fn edit_assignment_patches_only_given_fields() {
        let days = filled(&[1]);
        let patch = AssignmentPatch::default().reps("8-10").notes("controlar bajada");
        let next = edit_assignment(&days, 0, 0, &patch);
        let a = &next[0].exercises()[0];
        assert_eq!(a.reps, "8-10");
        assert_eq!(a.notes.as_deref(), Some("controlar bajada"));
        assert_eq!(a.sets, 3);
        assert_eq!(a.rest, "60s");
        assert_eq!(a.order(), 0);
        assert_eq!(a.exercise_id, "d0e0");
    }

    #[test]
    fn edit_assignment_sets_fall_back_on_bad_input() {
        let days = edit_assignment(&filled(&[1]), 0, 0, &AssignmentPatch::default().sets("5"));
        assert_eq!(days[0].exercises()[0].sets, 5);

        for bad in ["", "abc", "0", "-2", "4.5"] {
            let next = edit_assignment(&days, 0, 0, &AssignmentPatch::default().sets(bad));
            assert_eq!(next[0].exercises()[0].sets, 5, "input {bad:?}");
        }
    }

    #[test]
    fn edit_assignment_blank_notes_clear() {
        let days = edit_assignment(&filled(&[1]), 0, 0, &AssignmentPatch::default().notes("x"));
        let next = edit_assignment(&days, 0, 0, &AssignmentPatch::default().notes("  "));
        assert_eq!(next[0].exercises()[0].notes, None);
    }

    #[test]
    fn remove_assignment_restamps_order() {
        let days = filled(&[4]);
        let next = remove_assignment(&days, 0, 1);
        let ids: Vec<&str> = next[0]
            .exercises()
            .iter()
            .map(|a| a.exercise_id.as_str())
            .collect();
        assert_eq!(ids, vec!["d0e0", "d0e2", "d0e3"]);
        assert_contiguous(&next);
        assert_eq!(remove_assignment(&next, 0, 9), next);
    }

    #[test]
    fn move_assignment_reorders() {
        let days = filled(&[3]);
        let next = move_assignment(&days, 0, 2, 0);
        let ids: Vec<&str> = next[0]
            .exercises()
            .iter()
            .map(|a| a.exercise_id.as_str())
            .collect();
        assert_eq!(ids, vec!["d0e2", "d0e0", "d0e1"]);
        assert_contiguous(&next);
        assert_eq!(move_assignment(&days, 0, 0, 3), days);
    }

    #[test]
    fn toggle_superset_flips_flag() {
        let days = toggle_superset(&filled(&[2]), 0, 1);
        assert!(days[0].exercises()[1].is_superset);
        assert!(!days[0].exercises()[0].is_superset);
        let back = toggle_superset(&days, 0, 1);
        assert!(!back[0].exercises()[1].is_superset);
    }

    // -------------------------------------------------------------------
    // duplicate_day
    // -------------------------------------------------------------------

    #[test]
    fn duplicate_replaces_target_exercises_and_keeps_groups() {
        let mut days = filled(&[2, 3, 0]);
        days = toggle_muscle_group(&days, 1, "Espalda");
        let targets = BTreeSet::from([1, 2]);
        let next = duplicate_day(&days, 0, &targets);

        for t in [1, 2] {
            assert_eq!(next[t].exercises(), next[0].exercises());
        }
        assert_eq!(next[1].muscle_groups(), ["Espalda"]);
        assert!(next[2].muscle_groups().is_empty());
        assert_contiguous(&next);
    }

    #[test]
    fn duplicate_copies_are_independent() {
        let days = filled(&[1, 0]);
        let mut next = duplicate_day(&days, 0, &BTreeSet::from([1]));

        next[1].exercise_mut(0).unwrap().notes = Some("solo día 2".to_owned());
        assert_eq!(next[0].exercises()[0].notes, None);

        next[0].exercise_mut(0).unwrap().notes = Some("solo día 1".to_owned());
        assert_eq!(next[1].exercises()[0].notes.as_deref(), Some("solo día 2"));
    }

    #[test]
    fn duplicate_skips_source_in_targets() {
        let days = filled(&[2, 0]);
        let next = duplicate_day(&days, 0, &BTreeSet::from([0, 1]));
        assert_eq!(next[0], days[0]);
        assert_eq!(next[1].exercises().len(), 2);

        let only_self = duplicate_day(&days, 0, &BTreeSet::from([0]));
        assert_eq!(only_self, days);
    }

    #[test]
    fn duplicate_from_empty_source_is_noop() {
        let days = filled(&[0, 2]);
        assert_eq!(duplicate_day(&days, 0, &BTreeSet::from([1])), days);
    }

    #[test]
    fn duplicate_ignores_out_of_range_targets() {
        let days = filled(&[1, 0]);
        let next = duplicate_day(&days, 0, &BTreeSet::from([1, 7]));
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].exercises().len(), 1);
    }

    // -------------------------------------------------------------------
    // normalize_days
    // -------------------------------------------------------------------

    #[test]
    fn normalize_sorts_and_renumbers() {
        let a = ExerciseAssignment::from_catalog(&entry("a", "Pecho"));
        let days = vec![
            TrainingDay::new(5).with_exercises(vec![a.clone()]),
            TrainingDay::new(2),
        ];
        let next = normalize_days(days);
        assert_eq!(next[0].day_number(), 1);
        assert!(next[0].exercises().is_empty());
        assert_eq!(next[1].day_number(), 2);
        assert_eq!(next[1].exercises().len(), 1);
        assert_contiguous(&next);
    }

    #[test]
    fn parse_sets_fallback() {
        assert_eq!(parse_sets(" 4 ", 3), 4);
        assert_eq!(parse_sets("cuatro", 3), 3);
        assert_eq!(parse_sets("0", 2), 2);
    }
}
