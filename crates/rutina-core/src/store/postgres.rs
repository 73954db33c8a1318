//! Postgres-backed collaborators.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use rutina_db::queries::routines::{self as routine_queries, RoutineHeaderRow};
use rutina_db::queries::training_days::{self as day_queries, NewDayExercise};
use rutina_db::queries::{clients as client_queries, exercises as exercise_queries};

use super::{
    ClientDirectory, ExerciseCatalog, RoutineHeader, RoutineStore, RoutineWithDays, StoreError,
};
use crate::decode;
use crate::model::{CatalogExercise, ClientSummary, TrainingDay};
use crate::wizard::DEFAULT_DAY_NAME_PREFIX;

/// Catalog, client directory and routine store over one connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    day_name_prefix: String,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            day_name_prefix: DEFAULT_DAY_NAME_PREFIX.to_owned(),
        }
    }

    /// Prefix used for days stored without a name.
    pub fn with_day_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.day_name_prefix = prefix.into();
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_days(
        &self,
        conn: &mut PgConnection,
        routine_id: Uuid,
        days: &[TrainingDay],
    ) -> anyhow::Result<()> {
        for (idx, day) in days.iter().enumerate() {
            let day_number = to_i32(idx as u32 + 1, "day_number")?;
            let day_row = day_queries::insert_training_day(
                &mut *conn,
                routine_id,
                day_number,
                &day.display_name(&self.day_name_prefix),
                day.muscle_groups(),
            )
            .await?;

            for assignment in day.exercises() {
                let new = NewDayExercise {
                    position: to_i32(assignment.order(), "position")?,
                    exercise_id: assignment.exercise_id.clone(),
                    exercise_source: assignment.exercise_source,
                    exercise_name: assignment.exercise_name.clone(),
                    muscle_group: assignment.muscle_group.clone(),
                    sets: to_i32(assignment.sets, "sets")?,
                    reps: assignment.reps.clone(),
                    rest: assignment.rest.clone(),
                    notes: assignment.notes.clone(),
                    is_superset: assignment.is_superset,
                    image_url: assignment.image_url.clone(),
                    video_url: assignment.video_url.clone(),
                };
                day_queries::insert_day_exercise(&mut *conn, day_row.id, &new).await?;
            }
        }
        Ok(())
    }
}

fn to_i32(value: u32, field: &str) -> anyhow::Result<i32> {
    i32::try_from(value).with_context(|| format!("{field} out of range: {value}"))
}

fn header_row(header: &RoutineHeader) -> anyhow::Result<RoutineHeaderRow> {
    Ok(RoutineHeaderRow {
        client_id: header.client_id,
        name: header.name.clone(),
        objective: header.objective.clone(),
        training_days_count: to_i32(header.training_days_count, "training_days_count")?,
        duration_weeks: to_i32(header.duration_weeks, "duration_weeks")?,
        start_date: header.start_date,
        end_date: header.end_date,
        notes: header.notes.clone(),
    })
}

#[async_trait]
impl ExerciseCatalog for PgStore {
    async fn list_catalog_exercises(&self, coach_id: Uuid) -> Result<Vec<CatalogExercise>, StoreError> {
        let rows = exercise_queries::list_catalog_for_coach(&self.pool, coach_id).await?;
        debug!(%coach_id, count = rows.len(), "loaded exercise catalog");
        Ok(rows.into_iter().map(CatalogExercise::from).collect())
    }
}

#[async_trait]
impl ClientDirectory for PgStore {
    async fn list_clients(&self, coach_id: Uuid) -> Result<Vec<ClientSummary>, StoreError> {
        let rows = client_queries::list_clients_for_coach(&self.pool, coach_id).await?;
        debug!(%coach_id, count = rows.len(), "loaded clients");
        Ok(rows.into_iter().map(ClientSummary::from).collect())
    }
}

#[async_trait]
impl RoutineStore for PgStore {
    async fn create_routine(
        &self,
        coach_id: Uuid,
        header: &RoutineHeader,
        days: &[TrainingDay],
    ) -> Result<Uuid, StoreError> {
        let row = header_row(header)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        let routine = routine_queries::insert_routine(&mut *tx, coach_id, &row).await?;
        self.insert_days(&mut *tx, routine.id, days).await?;

        tx.commit().await.context("failed to commit routine")?;
        info!(routine_id = %routine.id, %coach_id, days = days.len(), "routine created");
        Ok(routine.id)
    }

    async fn update_routine(
        &self,
        coach_id: Uuid,
        routine_id: Uuid,
        header: &RoutineHeader,
        days: &[TrainingDay],
    ) -> Result<(), StoreError> {
        let row = header_row(header)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin transaction")?;

        let updated =
            routine_queries::update_routine_header(&mut *tx, coach_id, routine_id, &row).await?;
        if updated.is_none() {
            // Dropping the transaction rolls it back.
            return Err(StoreError::NotFound(routine_id));
        }

        let removed = day_queries::delete_days_for_routine(&mut *tx, routine_id).await?;
        self.insert_days(&mut *tx, routine_id, days).await?;

        tx.commit().await.context("failed to commit routine update")?;
        info!(%routine_id, %coach_id, replaced = removed, days = days.len(), "routine updated");
        Ok(())
    }

    async fn get_routine_with_days(
        &self,
        coach_id: Uuid,
        routine_id: Uuid,
    ) -> Result<Option<RoutineWithDays>, StoreError> {
        let Some(routine) = routine_queries::get_routine(&self.pool, coach_id, routine_id).await?
        else {
            return Ok(None);
        };
        let days = day_queries::list_days_for_routine(&self.pool, routine_id).await?;
        let exercises = day_queries::list_exercises_for_routine(&self.pool, routine_id).await?;

        let decoded = decode::decode_rows(routine, days, exercises)?;
        debug!(%routine_id, days = decoded.days.len(), "loaded routine");
        Ok(Some(decoded))
    }
}
