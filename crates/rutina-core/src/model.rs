//! Day/exercise value types.
//!
//! A routine under construction is a plain `Vec<TrainingDay>`. Two
//! invariants are kept by construction rather than by discipline:
//! `day_number` is always `index + 1` and every assignment's `order` is its
//! index within the day. Neither field has a public setter; the planning
//! engine restamps both after every structural change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use rutina_db::models::ExerciseSource;

/// Sets given to a freshly selected exercise.
pub const DEFAULT_SETS: u32 = 3;
/// Reps given to a freshly selected exercise.
pub const DEFAULT_REPS: &str = "10-12";
/// Rest given to a freshly selected exercise.
pub const DEFAULT_REST: &str = "60s";

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// One entry of the merged exercise catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogExercise {
    pub id: String,
    pub name: String,
    pub muscle_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// `true` for library-wide entries, `false` for coach-owned ones.
    pub is_global: bool,
}

impl CatalogExercise {
    /// Provenance tag stamped onto assignments made from this entry.
    pub fn source(&self) -> ExerciseSource {
        if self.is_global {
            ExerciseSource::CatalogWide
        } else {
            ExerciseSource::CoachOwned
        }
    }
}

impl From<rutina_db::models::Exercise> for CatalogExercise {
    fn from(row: rutina_db::models::Exercise) -> Self {
        Self {
            is_global: row.is_global(),
            id: row.id.to_string(),
            name: row.name,
            muscle_group: row.muscle_group,
            image_url: row.image_url,
            video_url: row.video_url,
        }
    }
}

/// Client picker entry for the details step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<rutina_db::models::Client> for ClientSummary {
    fn from(row: rutina_db::models::Client) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

// ---------------------------------------------------------------------------
// ExerciseAssignment
// ---------------------------------------------------------------------------

/// An exercise placed into a training day, with its coaching parameters.
///
/// Name, muscle group and media are a snapshot taken at selection time, so
/// the routine stays readable after the catalog entry changes or goes away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseAssignment {
    pub exercise_id: String,
    pub exercise_source: ExerciseSource,
    pub exercise_name: String,
    pub muscle_group: String,
    pub sets: u32,
    pub reps: String,
    pub rest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_superset: bool,
    #[serde(default)]
    order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl ExerciseAssignment {
    /// Build an assignment from a catalog entry with default parameters.
    pub fn from_catalog(exercise: &CatalogExercise) -> Self {
        Self {
            exercise_id: exercise.id.clone(),
            exercise_source: exercise.source(),
            exercise_name: exercise.name.clone(),
            muscle_group: exercise.muscle_group.clone(),
            sets: DEFAULT_SETS,
            reps: DEFAULT_REPS.to_owned(),
            rest: DEFAULT_REST.to_owned(),
            notes: None,
            is_superset: false,
            order: 0,
            image_url: exercise.image_url.clone(),
            video_url: exercise.video_url.clone(),
        }
    }

    /// Position within the owning day.
    pub fn order(&self) -> u32 {
        self.order
    }
}

// ---------------------------------------------------------------------------
// TrainingDay
// ---------------------------------------------------------------------------

/// One day slot of a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingDay {
    day_number: u32,
    /// Display name; filled with a localized default at save time when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_name: Option<String>,
    #[serde(default)]
    muscle_groups: Vec<String>,
    #[serde(default)]
    exercises: Vec<ExerciseAssignment>,
}

impl TrainingDay {
    /// An empty day at the given 1-based position.
    pub fn new(day_number: u32) -> Self {
        Self {
            day_number,
            day_name: None,
            muscle_groups: Vec::new(),
            exercises: Vec::new(),
        }
    }

    /// Set the muscle groups, keeping first-seen order and dropping repeats.
    pub fn with_muscle_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.muscle_groups.clear();
        for group in groups {
            let group = group.into();
            if !self.muscle_groups.contains(&group) {
                self.muscle_groups.push(group);
            }
        }
        self
    }

    /// Set the assignments, restamping `order` from list position.
    pub fn with_exercises(mut self, exercises: Vec<ExerciseAssignment>) -> Self {
        self.exercises = exercises;
        self.restamp_orders();
        self
    }

    /// Set the display name.
    pub fn with_day_name(mut self, name: impl Into<String>) -> Self {
        self.day_name = Some(name.into());
        self
    }

    pub fn day_number(&self) -> u32 {
        self.day_number
    }

    /// Selected muscle groups in the order the coach picked them.
    pub fn muscle_groups(&self) -> &[String] {
        &self.muscle_groups
    }

    pub fn exercises(&self) -> &[ExerciseAssignment] {
        &self.exercises
    }

    /// Mutable access to one assignment's parameters. `order` stays
    /// protected since it has no public setter.
    pub fn exercise_mut(&mut self, index: usize) -> Option<&mut ExerciseAssignment> {
        self.exercises.get_mut(index)
    }

    pub fn has_muscle_group(&self, group: &str) -> bool {
        self.muscle_groups.iter().any(|g| g == group)
    }

    /// True iff some assignment in this day references `exercise_id`.
    pub fn is_assigned(&self, exercise_id: &str) -> bool {
        self.exercises.iter().any(|a| a.exercise_id == exercise_id)
    }

    /// Catalog entries whose muscle group is selected for this day.
    ///
    /// Grouped by the position of the muscle group in
    /// [`Self::muscle_groups`], so candidates appear group by group in
    /// the order the coach picked them. Within a group, catalog order is
    /// kept.
    pub fn candidates_for<'a>(&self, catalog: &'a [CatalogExercise]) -> Vec<&'a CatalogExercise> {
        let mut ranked: Vec<(usize, &CatalogExercise)> = catalog
            .iter()
            .filter_map(|ex| {
                self.muscle_groups
                    .iter()
                    .position(|g| *g == ex.muscle_group)
                    .map(|rank| (rank, ex))
            })
            .collect();
        // Stable sort: ties keep catalog order.
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, ex)| ex).collect()
    }

    /// `day_name`, or `"<prefix> <day_number>"` when unset or blank.
    pub fn display_name(&self, prefix: &str) -> String {
        match self.day_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => format!("{prefix} {}", self.day_number),
        }
    }

    pub(crate) fn set_day_number(&mut self, day_number: u32) {
        self.day_number = day_number;
    }

    pub(crate) fn muscle_groups_mut(&mut self) -> &mut Vec<String> {
        &mut self.muscle_groups
    }

    pub(crate) fn exercises_vec_mut(&mut self) -> &mut Vec<ExerciseAssignment> {
        &mut self.exercises
    }

    pub(crate) fn restamp_orders(&mut self) {
        for (idx, assignment) in self.exercises.iter_mut().enumerate() {
            assignment.order = idx as u32;
        }
    }
}
