//! Database query functions for the `exercises` catalog table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Exercise;

/// Parameters for inserting a catalog exercise.
#[derive(Debug, Clone)]
pub struct NewExercise {
    /// Owning coach, or `None` for a library-wide entry.
    pub coach_id: Option<Uuid>,
    pub name: String,
    pub muscle_group: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

/// Insert a catalog exercise.
pub async fn insert_exercise(pool: &PgPool, new: &NewExercise) -> Result<Exercise> {
    let exercise = sqlx::query_as::<_, Exercise>(
        "INSERT INTO exercises (coach_id, name, muscle_group, image_url, video_url) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING *",
    )
    .bind(new.coach_id)
    .bind(&new.name)
    .bind(&new.muscle_group)
    .bind(&new.image_url)
    .bind(&new.video_url)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert exercise {:?}", new.name))?;

    Ok(exercise)
}

/// List the merged catalog visible to a coach: every library-wide entry
/// plus the coach's own, sorted by name.
pub async fn list_catalog_for_coach(pool: &PgPool, coach_id: Uuid) -> Result<Vec<Exercise>> {
    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT * FROM exercises \
         WHERE coach_id IS NULL OR coach_id = $1 \
         ORDER BY lower(name), name, created_at",
    )
    .bind(coach_id)
    .fetch_all(pool)
    .await
    .context("failed to list catalog exercises")?;

    Ok(exercises)
}
