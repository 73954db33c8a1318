//! Collaborator interfaces the wizard talks to: the exercise catalog, the
//! client directory, and routine persistence.
//!
//! The traits are object-safe so callers can hold `&dyn RoutineStore`.
//! [`PgStore`] implements all three over the `rutina-db` schema.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::decode::DecodeError;
use crate::model::{CatalogExercise, ClientSummary, TrainingDay};

pub use postgres::PgStore;

/// Errors surfaced by collaborator calls.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("routine {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Top-level routine fields, without the day list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineHeader {
    pub client_id: Uuid,
    pub name: String,
    pub objective: String,
    pub training_days_count: u32,
    pub duration_weeks: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A stored routine with its days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineWithDays {
    pub id: Uuid,
    pub header: RoutineHeader,
    pub days: Vec<TrainingDay>,
}

/// Read-only merged exercise catalog.
#[async_trait]
pub trait ExerciseCatalog: Send + Sync {
    /// Library-wide and coach-owned exercises, merged and sorted by name.
    async fn list_catalog_exercises(&self, coach_id: Uuid) -> Result<Vec<CatalogExercise>, StoreError>;
}

/// Read-only client list for the details step.
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    async fn list_clients(&self, coach_id: Uuid) -> Result<Vec<ClientSummary>, StoreError>;
}

/// Routine persistence.
#[async_trait]
pub trait RoutineStore: Send + Sync {
    /// Store a new routine and return its id.
    async fn create_routine(
        &self,
        coach_id: Uuid,
        header: &RoutineHeader,
        days: &[TrainingDay],
    ) -> Result<Uuid, StoreError>;

    /// Replace a routine's header and its whole day list in one step.
    async fn update_routine(
        &self,
        coach_id: Uuid,
        routine_id: Uuid,
        header: &RoutineHeader,
        days: &[TrainingDay],
    ) -> Result<(), StoreError>;

    /// Fetch a routine with its days, or `None` if the coach has no such
    /// routine.
    async fn get_routine_with_days(
        &self,
        coach_id: Uuid,
        routine_id: Uuid,
    ) -> Result<Option<RoutineWithDays>, StoreError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn RoutineStore, _: &dyn ExerciseCatalog, _: &dyn ClientDirectory) {}
};
