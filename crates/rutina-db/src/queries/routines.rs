//! Database query functions for the `routines` table.
//!
//! Writes take a `&mut PgConnection` so callers can run them inside a
//! transaction together with the day inserts in [`super::training_days`].

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::Routine;

/// Header fields written on create and update.
#[derive(Debug, Clone)]
pub struct RoutineHeaderRow {
    pub client_id: Uuid,
    pub name: String,
    pub objective: String,
    pub training_days_count: i32,
    pub duration_weeks: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Insert a routine header. Returns the inserted row.
pub async fn insert_routine(
    conn: &mut PgConnection,
    coach_id: Uuid,
    header: &RoutineHeaderRow,
) -> Result<Routine> {
    let routine = sqlx::query_as::<_, Routine>(
        "INSERT INTO routines \
         (coach_id, client_id, name, objective, training_days_count, duration_weeks, start_date, end_date, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING *",
    )
    .bind(coach_id)
    .bind(header.client_id)
    .bind(&header.name)
    .bind(&header.objective)
    .bind(header.training_days_count)
    .bind(header.duration_weeks)
    .bind(header.start_date)
    .bind(header.end_date)
    .bind(&header.notes)
    .fetch_one(conn)
    .await
    .with_context(|| format!("failed to insert routine {:?}", header.name))?;

    Ok(routine)
}

/// Overwrite a routine header owned by `coach_id`.
///
/// Returns `None` when no routine with that id belongs to the coach.
pub async fn update_routine_header(
    conn: &mut PgConnection,
    coach_id: Uuid,
    routine_id: Uuid,
    header: &RoutineHeaderRow,
) -> Result<Option<Routine>> {
    let routine = sqlx::query_as::<_, Routine>(
        "UPDATE routines \
         SET client_id = $3, name = $4, objective = $5, training_days_count = $6, \
             duration_weeks = $7, start_date = $8, end_date = $9, notes = $10, updated_at = now() \
         WHERE id = $1 AND coach_id = $2 \
         RETURNING *",
    )
    .bind(routine_id)
    .bind(coach_id)
    .bind(header.client_id)
    .bind(&header.name)
    .bind(&header.objective)
    .bind(header.training_days_count)
    .bind(header.duration_weeks)
    .bind(header.start_date)
    .bind(header.end_date)
    .bind(&header.notes)
    .fetch_optional(conn)
    .await
    .with_context(|| format!("failed to update routine {routine_id}"))?;

    Ok(routine)
}

/// Fetch a routine by ID, scoped to its owning coach.
pub async fn get_routine(pool: &PgPool, coach_id: Uuid, id: Uuid) -> Result<Option<Routine>> {
    let routine =
        sqlx::query_as::<_, Routine>("SELECT * FROM routines WHERE id = $1 AND coach_id = $2")
            .bind(id)
            .bind(coach_id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch routine")?;

    Ok(routine)
}

/// List a coach's routines, newest first.
pub async fn list_routines_for_coach(pool: &PgPool, coach_id: Uuid) -> Result<Vec<Routine>> {
    let routines = sqlx::query_as::<_, Routine>(
        "SELECT * FROM routines WHERE coach_id = $1 ORDER BY created_at DESC",
    )
    .bind(coach_id)
    .fetch_all(pool)
    .await
    .context("failed to list routines")?;

    Ok(routines)
}
