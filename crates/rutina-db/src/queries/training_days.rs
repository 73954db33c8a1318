//! Database query functions for the `training_days` and `day_exercises`
//! tables.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{DayExercise, ExerciseSource, TrainingDay};

/// Parameters for inserting one assignment row.
#[derive(Debug, Clone)]
pub struct NewDayExercise {
    pub position: i32,
    pub exercise_id: String,
    pub exercise_source: ExerciseSource,
    pub exercise_name: String,
    pub muscle_group: String,
    pub sets: i32,
    pub reps: String,
    pub rest: String,
    pub notes: Option<String>,
    pub is_superset: bool,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

/// Insert a training day row.
pub async fn insert_training_day(
    conn: &mut PgConnection,
    routine_id: Uuid,
    day_number: i32,
    day_name: &str,
    muscle_groups: &[String],
) -> Result<TrainingDay> {
    let day = sqlx::query_as::<_, TrainingDay>(
        "INSERT INTO training_days (routine_id, day_number, day_name, muscle_groups) \
         VALUES ($1, $2, $3, $4) \
         RETURNING *",
    )
    .bind(routine_id)
    .bind(day_number)
    .bind(day_name)
    .bind(muscle_groups)
    .fetch_one(conn)
    .await
    .with_context(|| format!("failed to insert training day {day_number}"))?;

    Ok(day)
}

/// Insert one assignment row under a day.
pub async fn insert_day_exercise(
    conn: &mut PgConnection,
    day_id: Uuid,
    new: &NewDayExercise,
) -> Result<DayExercise> {
    let row = sqlx::query_as::<_, DayExercise>(
        "INSERT INTO day_exercises \
         (day_id, position, exercise_id, exercise_source, exercise_name, muscle_group, \
          sets, reps, rest, notes, is_superset, image_url, video_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING *",
    )
    .bind(day_id)
    .bind(new.position)
    .bind(&new.exercise_id)
    .bind(new.exercise_source.to_string())
    .bind(&new.exercise_name)
    .bind(&new.muscle_group)
    .bind(new.sets)
    .bind(&new.reps)
    .bind(&new.rest)
    .bind(&new.notes)
    .bind(new.is_superset)
    .bind(&new.image_url)
    .bind(&new.video_url)
    .fetch_one(conn)
    .await
    .with_context(|| {
        format!(
            "failed to insert exercise {:?} at position {}",
            new.exercise_name, new.position
        )
    })?;

    Ok(row)
}

/// Delete every day of a routine. Assignments go with them via
/// `ON DELETE CASCADE`. Returns the number of days removed.
pub async fn delete_days_for_routine(conn: &mut PgConnection, routine_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM training_days WHERE routine_id = $1")
        .bind(routine_id)
        .execute(conn)
        .await
        .with_context(|| format!("failed to delete days of routine {routine_id}"))?;

    Ok(result.rows_affected())
}

/// List the days of a routine, ordered by day number.
pub async fn list_days_for_routine(pool: &PgPool, routine_id: Uuid) -> Result<Vec<TrainingDay>> {
    let days = sqlx::query_as::<_, TrainingDay>(
        "SELECT * FROM training_days WHERE routine_id = $1 ORDER BY day_number",
    )
    .bind(routine_id)
    .fetch_all(pool)
    .await
    .context("failed to list training days")?;

    Ok(days)
}

/// List every assignment of a routine, ordered by day then position.
pub async fn list_exercises_for_routine(
    pool: &PgPool,
    routine_id: Uuid,
) -> Result<Vec<DayExercise>> {
    let rows = sqlx::query_as::<_, DayExercise>(
        "SELECT de.* FROM day_exercises de \
         JOIN training_days td ON td.id = de.day_id \
         WHERE td.routine_id = $1 \
         ORDER BY td.day_number, de.position",
    )
    .bind(routine_id)
    .fetch_all(pool)
    .await
    .context("failed to list day exercises")?;

    Ok(rows)
}
