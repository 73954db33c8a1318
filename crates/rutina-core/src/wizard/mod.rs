//! Wizard controller: the gated Details → Planning → Review flow.
//!
//! [`WizardController`] owns all wizard state. Every change to the day list
//! goes through a [`crate::planning`] function whose result replaces the
//! list wholesale. Step guards live in [`guard`]; the mapping to the
//! persistence shape lives in [`draft`].
//!
//! ```text
//! Details  -> Planning   (details guard)
//! Planning -> Review     (every day has exercises; focus first empty day)
//! Planning -> Details    (back)
//! Review   -> Planning   (back)
//! Review   -> saved      (store create or update; controller closes)
//! any      -> cancelled  (state discarded)
//! ```

pub mod draft;
pub mod guard;

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::decode;
use crate::model::{CatalogExercise, ClientSummary, TrainingDay};
use crate::planning::{self, AssignmentPatch, MAX_DAYS};
use crate::store::{ClientDirectory, ExerciseCatalog, RoutineStore, StoreError};

pub use draft::{RoutineDraft, build_draft};
pub use guard::ValidationError;

/// Label used for unnamed days unless configured otherwise.
pub const DEFAULT_DAY_NAME_PREFIX: &str = "Día";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The three wizard steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Details,
    Planning,
    Review,
}

impl WizardStep {
    /// Step reached by `next()`, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Details => Some(Self::Planning),
            Self::Planning => Some(Self::Review),
            Self::Review => None,
        }
    }

    /// Step reached by `back()`, if any.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Details => None,
            Self::Planning => Some(Self::Details),
            Self::Review => Some(Self::Planning),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Details => write!(f, "details"),
            Self::Planning => write!(f, "planning"),
            Self::Review => write!(f, "review"),
        }
    }
}

/// Knobs that do not change during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardConfig {
    /// Label for default day names: `"<prefix> <day_number>"`.
    pub day_name_prefix: String,
    pub max_days: usize,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            day_name_prefix: DEFAULT_DAY_NAME_PREFIX.to_owned(),
            max_days: MAX_DAYS,
        }
    }
}

/// Details step form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineDetails {
    pub name: String,
    pub client_id: Option<Uuid>,
    pub objective: String,
    pub duration_weeks: u32,
    pub days_count: u32,
    pub notes: String,
}

impl Default for RoutineDetails {
    fn default() -> Self {
        Self {
            name: String::new(),
            client_id: None,
            objective: String::new(),
            duration_weeks: 4,
            days_count: 3,
            notes: String::new(),
        }
    }
}

/// Whether saving creates a routine or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Edit { routine_id: Uuid },
}

/// How a wizard session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    Saved { routine_id: Uuid },
    Cancelled,
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("operation requires the {expected} step, wizard is at {actual}")]
    WrongStep {
        expected: WizardStep,
        actual: WizardStep,
    },

    #[error("wizard session already saved")]
    Closed,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WizardError {
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(v) => Some(v),
            _ => None,
        }
    }
}

/// Catalog and client list, each with the error from its last load.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub catalog: Vec<CatalogExercise>,
    pub clients: Vec<ClientSummary>,
    pub catalog_error: Option<String>,
    pub clients_error: Option<String>,
}

// ---------------------------------------------------------------------------
// WizardController
// ---------------------------------------------------------------------------

pub struct WizardController {
    coach_id: Uuid,
    config: WizardConfig,
    mode: SessionMode,
    step: WizardStep,
    details: RoutineDetails,
    days: Vec<TrainingDay>,
    focused_day: usize,
    edit_target: Option<usize>,
    copy_targets: BTreeSet<usize>,
    reference: ReferenceData,
    loading: bool,
    closed: bool,
}

impl WizardController {
    /// Start a session for a new routine.
    pub fn new(coach_id: Uuid, config: WizardConfig) -> Self {
        let details = RoutineDetails::default();
        let days = planning::resize_days(&[], details.days_count as usize);
        Self {
            coach_id,
            config,
            mode: SessionMode::Create,
            step: WizardStep::Details,
            details,
            days,
            focused_day: 0,
            edit_target: None,
            copy_targets: BTreeSet::new(),
            reference: ReferenceData::default(),
            loading: false,
            closed: false,
        }
    }

    /// Start a session editing an existing routine.
    ///
    /// Details and days are taken from the stored routine and the session
    /// opens at the Details step. Days are renumbered into canonical shape;
    /// a routine whose day count disagrees with its days, or that holds no
    /// days or more than `max_days`, is rejected with a decode error.
    pub async fn load_for_edit(
        coach_id: Uuid,
        routine_id: Uuid,
        config: WizardConfig,
        store: &dyn RoutineStore,
    ) -> Result<Self, WizardError> {
        let mut wizard = Self::new(coach_id, config);
        wizard.mode = SessionMode::Edit { routine_id };
        wizard.loading = true;

        let routine = store
            .get_routine_with_days(coach_id, routine_id)
            .await?
            .ok_or(StoreError::NotFound(routine_id))?;

        let days = planning::normalize_days(routine.days);
        decode::check_day_count(
            routine.header.training_days_count,
            days.len(),
            wizard.config.max_days,
        )
        .map_err(StoreError::Decode)?;
        wizard.days = days;
        // Resize is suppressed while loading, so the fetched days survive.
        let loaded = draft::details_from_header(&routine.header);
        wizard.set_days_count(loaded.days_count)?;
        wizard.details = loaded;
        wizard.loading = false;

        info!(%routine_id, %coach_id, days = wizard.days.len(), "loaded routine for edit");
        Ok(wizard)
    }

    /// Fetch the exercise catalog and client list. Failures are recorded
    /// in [`ReferenceData`] and leave previously loaded data in place.
    pub async fn load_reference_data(&mut self, catalog: &dyn ExerciseCatalog, clients: &dyn ClientDirectory) {
        match catalog.list_catalog_exercises(self.coach_id).await {
            Ok(entries) => {
                debug!(count = entries.len(), "catalog loaded");
                self.reference.catalog = entries;
                self.reference.catalog_error = None;
            }
            Err(e) => {
                warn!(coach_id = %self.coach_id, error = %e, "failed to load exercise catalog");
                self.reference.catalog_error = Some(e.to_string());
            }
        }
        match clients.list_clients(self.coach_id).await {
            Ok(entries) => {
                debug!(count = entries.len(), "clients loaded");
                self.reference.clients = entries;
                self.reference.clients_error = None;
            }
            Err(e) => {
                warn!(coach_id = %self.coach_id, error = %e, "failed to load clients");
                self.reference.clients_error = Some(e.to_string());
            }
        }
    }

    /// Replace the reference data wholesale, e.g. with a catalog fetched
    /// elsewhere.
    pub fn set_reference_data(&mut self, reference: ReferenceData) {
        self.reference = reference;
    }

    // -- accessors ----------------------------------------------------------

    pub fn coach_id(&self) -> Uuid {
        self.coach_id
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn details(&self) -> &RoutineDetails {
        &self.details
    }

    pub fn days(&self) -> &[TrainingDay] {
        &self.days
    }

    pub fn focused_day(&self) -> usize {
        self.focused_day
    }

    pub fn edit_target(&self) -> Option<usize> {
        self.edit_target
    }

    pub fn copy_targets(&self) -> &BTreeSet<usize> {
        &self.copy_targets
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Catalog entries offered for the focused day.
    pub fn candidates(&self) -> Vec<&CatalogExercise> {
        match self.days.get(self.focused_day) {
            Some(day) => day.candidates_for(&self.reference.catalog),
            None => Vec::new(),
        }
    }

    // -- details step -------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::Details)?;
        self.details.name = name.into();
        Ok(())
    }

    pub fn set_client(&mut self, client_id: Option<Uuid>) -> Result<(), WizardError> {
        self.require(WizardStep::Details)?;
        self.details.client_id = client_id;
        Ok(())
    }

    pub fn set_objective(&mut self, objective: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::Details)?;
        self.details.objective = objective.into();
        Ok(())
    }

    pub fn set_duration_weeks(&mut self, weeks: u32) -> Result<(), WizardError> {
        self.require(WizardStep::Details)?;
        self.details.duration_weeks = weeks;
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::Details)?;
        self.details.notes = notes.into();
        Ok(())
    }

    /// Change the number of training days, resizing the day list at once.
    ///
    /// Out-of-range values are rejected and leave the form unchanged.
    pub fn set_days_count(&mut self, count: u32) -> Result<(), WizardError> {
        self.require(WizardStep::Details)?;
        guard::validate_days_count(count, self.config.max_days)?;
        self.details.days_count = count;
        if !self.loading {
            self.days = planning::resize_days(&self.days, count as usize);
            self.focused_day = self.focused_day.min(self.days.len().saturating_sub(1));
        }
        Ok(())
    }

    // -- navigation ---------------------------------------------------------

    /// Advance one step if its guard passes.
    ///
    /// From Planning, an empty day rejects the move and becomes the focused
    /// day. Review has no next step; use [`Self::save`].
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        match self.step {
            WizardStep::Details => {
                guard::validate_details(&self.details, self.config.max_days)?;
            }
            WizardStep::Planning => {
                if let Err(e) = guard::validate_planning(&self.days) {
                    if let Some(index) = e.day_index() {
                        self.focused_day = index;
                        self.clear_transient();
                    }
                    debug!(error = %e, "planning guard rejected");
                    return Err(e.into());
                }
            }
            WizardStep::Review => {
                return Err(WizardError::WrongStep {
                    expected: WizardStep::Planning,
                    actual: WizardStep::Review,
                });
            }
        }
        let to = self.step.next().unwrap_or(self.step);
        self.transition(to);
        Ok(to)
    }

    /// Go back one step. Never validated.
    pub fn back(&mut self) -> Result<WizardStep, WizardError> {
        self.ensure_open()?;
        let to = self.step.previous().ok_or(WizardError::WrongStep {
            expected: WizardStep::Planning,
            actual: self.step,
        })?;
        self.transition(to);
        Ok(to)
    }

    /// Discard the session without persisting anything.
    pub fn cancel(self) -> WizardOutcome {
        debug!(step = %self.step, "wizard cancelled");
        WizardOutcome::Cancelled
    }

    // -- planning step ------------------------------------------------------

    pub fn focus_day(&mut self, index: usize) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        self.check_day(index)?;
        if index != self.focused_day {
            self.focused_day = index;
            self.clear_transient();
        }
        Ok(())
    }

    pub fn toggle_muscle_group(&mut self, group: &str) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        self.days = planning::toggle_muscle_group(&self.days, self.focused_day, group);
        Ok(())
    }

    /// Toggle a catalog exercise on the focused day.
    ///
    /// An assigned exercise can always be toggled off, even if it has since
    /// left the catalog.
    pub fn toggle_exercise(&mut self, exercise_id: &str) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        let day = self.focused()?;

        let entry = match self.reference.catalog.iter().find(|e| e.id == exercise_id) {
            Some(entry) => entry.clone(),
            None => match day.exercises().iter().find(|a| a.exercise_id == exercise_id) {
                Some(assigned) => CatalogExercise {
                    id: assigned.exercise_id.clone(),
                    name: assigned.exercise_name.clone(),
                    muscle_group: assigned.muscle_group.clone(),
                    image_url: assigned.image_url.clone(),
                    video_url: assigned.video_url.clone(),
                    is_global: assigned.exercise_source == crate::model::ExerciseSource::CatalogWide,
                },
                None => return Err(ValidationError::UnknownExercise(exercise_id.to_owned()).into()),
            },
        };

        self.days = planning::toggle_exercise(&self.days, self.focused_day, &entry);
        self.edit_target = None;
        Ok(())
    }

    pub fn toggle_superset(&mut self, exercise_index: usize) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        self.check_exercise(exercise_index)?;
        self.days = planning::toggle_superset(&self.days, self.focused_day, exercise_index);
        Ok(())
    }

    pub fn remove_assignment(&mut self, exercise_index: usize) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        self.check_exercise(exercise_index)?;
        self.days = planning::remove_assignment(&self.days, self.focused_day, exercise_index);
        self.edit_target = None;
        Ok(())
    }

    pub fn move_assignment(&mut self, from: usize, to: usize) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        self.check_exercise(from)?;
        self.check_exercise(to)?;
        self.days = planning::move_assignment(&self.days, self.focused_day, from, to);
        self.edit_target = None;
        Ok(())
    }

    /// Open the edit modal on one assignment of the focused day.
    pub fn open_edit(&mut self, exercise_index: usize) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        self.check_exercise(exercise_index)?;
        self.edit_target = Some(exercise_index);
        Ok(())
    }

    /// Apply `patch` to the assignment open for editing and close the modal.
    pub fn apply_edit(&mut self, patch: &AssignmentPatch) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        let index = self.edit_target.ok_or(ValidationError::NoEditTarget)?;
        self.days = planning::edit_assignment(&self.days, self.focused_day, index, patch);
        self.edit_target = None;
        Ok(())
    }

    pub fn close_edit(&mut self) {
        self.edit_target = None;
    }

    /// Select or deselect a day as a copy target for the focused day.
    /// Returns whether the day is now selected.
    pub fn toggle_copy_target(&mut self, index: usize) -> Result<bool, WizardError> {
        self.require(WizardStep::Planning)?;
        self.check_day(index)?;
        if index == self.focused_day {
            return Err(ValidationError::CopyToSelf { index }.into());
        }
        if self.copy_targets.remove(&index) {
            Ok(false)
        } else {
            self.copy_targets.insert(index);
            Ok(true)
        }
    }

    /// Copy the focused day's exercises onto every selected target day.
    pub fn duplicate_focused_day(&mut self) -> Result<(), WizardError> {
        self.require(WizardStep::Planning)?;
        let source = self.focused_day;
        if self.focused()?.exercises().is_empty() {
            return Err(ValidationError::EmptyCopySource { index: source }.into());
        }
        if self.copy_targets.is_empty() {
            return Err(ValidationError::NoCopyTargets.into());
        }
        self.days = planning::duplicate_day(&self.days, source, &self.copy_targets);
        debug!(source, targets = ?self.copy_targets, "day duplicated");
        self.copy_targets.clear();
        Ok(())
    }

    // -- review step --------------------------------------------------------

    /// Persistence shape of the current state, stamped at `now`.
    pub fn draft_at(&self, now: DateTime<Utc>) -> Result<RoutineDraft, WizardError> {
        Ok(build_draft(&self.details, &self.days, &self.config.day_name_prefix, now)?)
    }

    pub async fn save(&mut self, store: &dyn RoutineStore) -> Result<WizardOutcome, WizardError> {
        self.save_at(store, Utc::now()).await
    }

    /// Create or replace the routine. On failure the wizard state is left
    /// exactly as it was so the save can be retried.
    pub async fn save_at(
        &mut self,
        store: &dyn RoutineStore,
        now: DateTime<Utc>,
    ) -> Result<WizardOutcome, WizardError> {
        self.require(WizardStep::Review)?;
        guard::validate_details(&self.details, self.config.max_days)?;
        guard::validate_planning(&self.days)?;
        let draft = self.draft_at(now)?;

        let result = match self.mode {
            SessionMode::Create => {
                store
                    .create_routine(self.coach_id, &draft.header, &draft.days)
                    .await
            }
            SessionMode::Edit { routine_id } => store
                .update_routine(self.coach_id, routine_id, &draft.header, &draft.days)
                .await
                .map(|()| routine_id),
        };

        match result {
            Ok(routine_id) => {
                info!(%routine_id, coach_id = %self.coach_id, days = draft.days.len(), "routine saved");
                self.clear_transient();
                self.closed = true;
                Ok(WizardOutcome::Saved { routine_id })
            }
            Err(e) => {
                warn!(coach_id = %self.coach_id, error = %e, "failed to save routine");
                Err(e.into())
            }
        }
    }

    // -- internals ----------------------------------------------------------

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.closed {
            return Err(WizardError::Closed);
        }
        Ok(())
    }

    fn require(&self, expected: WizardStep) -> Result<(), WizardError> {
        self.ensure_open()?;
        if self.step != expected {
            return Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn check_day(&self, index: usize) -> Result<(), ValidationError> {
        if index >= self.days.len() {
            return Err(ValidationError::DayOutOfRange {
                index,
                len: self.days.len(),
            });
        }
        Ok(())
    }

    fn focused(&self) -> Result<&TrainingDay, ValidationError> {
        self.days.get(self.focused_day).ok_or(ValidationError::DayOutOfRange {
            index: self.focused_day,
            len: self.days.len(),
        })
    }

    fn check_exercise(&self, index: usize) -> Result<(), ValidationError> {
        let len = self.focused()?.exercises().len();
        if index >= len {
            return Err(ValidationError::ExerciseOutOfRange { index, len });
        }
        Ok(())
    }

    fn transition(&mut self, to: WizardStep) {
        debug!(from = %self.step, %to, "wizard step");
        self.step = to;
        self.clear_transient();
        if to == WizardStep::Planning {
            self.focused_day = self.focused_day.min(self.days.len().saturating_sub(1));
        }
    }

    fn clear_transient(&mut self) {
        self.edit_target = None;
        self.copy_targets.clear();
    }
}
