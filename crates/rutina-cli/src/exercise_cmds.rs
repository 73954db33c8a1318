//! CLI handlers for `rutina exercise` subcommands.
//!
//! Implements:
//! - `rutina exercise add <name> --muscle-group <g>` -- add a catalog entry
//! - `rutina exercise list [--muscle-group <g>]`     -- show the merged catalog

use anyhow::{Result, bail};
use sqlx::PgPool;
use uuid::Uuid;

use rutina_core::store::{ExerciseCatalog, PgStore};
use rutina_db::queries::exercises::{self as exercise_queries, NewExercise};

use crate::ExerciseCommands;

/// Dispatch an `ExerciseCommands` variant to the appropriate handler.
pub async fn run_exercise_command(command: ExerciseCommands, pool: &PgPool, coach_id: Uuid) -> Result<()> {
    match command {
        ExerciseCommands::Add {
            name,
            muscle_group,
            image_url,
            video_url,
            global,
        } => {
            let new = NewExercise {
                coach_id: (!global).then_some(coach_id),
                name: name.trim().to_string(),
                muscle_group: muscle_group.trim().to_string(),
                image_url,
                video_url,
            };
            cmd_add(pool, &new).await
        }
        ExerciseCommands::List { muscle_group } => cmd_list(pool, coach_id, muscle_group.as_deref()).await,
    }
}

async fn cmd_add(pool: &PgPool, new: &NewExercise) -> Result<()> {
    if new.name.is_empty() {
        bail!("exercise name must not be empty");
    }
    if new.muscle_group.is_empty() {
        bail!("muscle group must not be empty");
    }
    let exercise = exercise_queries::insert_exercise(pool, new).await?;

    println!("Exercise added.");
    println!("  ID:            {}", exercise.id);
    println!("  Name:          {}", exercise.name);
    println!("  Muscle group:  {}", exercise.muscle_group);
    println!(
        "  Scope:         {}",
        if exercise.is_global() { "library" } else { "coach" }
    );
    Ok(())
}

async fn cmd_list(pool: &PgPool, coach_id: Uuid, muscle_group: Option<&str>) -> Result<()> {
    let store = PgStore::new(pool.clone());
    let catalog = store.list_catalog_exercises(coach_id).await?;
    let entries: Vec<_> = catalog
        .iter()
        .filter(|e| muscle_group.is_none_or(|g| e.muscle_group.eq_ignore_ascii_case(g)))
        .collect();

    if entries.is_empty() {
        println!("No exercises found.");
        return Ok(());
    }

    let id_w = 36;
    let name_w = entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(4).max(4);
    let group_w = entries
        .iter()
        .map(|e| e.muscle_group.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    println!("{:<id_w$}  {:<name_w$}  {:<group_w$}  SCOPE", "ID", "NAME", "GROUP");
    for e in entries {
        let scope = if e.is_global { "library" } else { "coach" };
        println!("{:<id_w$}  {:<name_w$}  {:<group_w$}  {scope}", e.id, e.name, e.muscle_group);
    }
    Ok(())
}
