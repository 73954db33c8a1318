//! CLI handlers for `rutina routine` subcommands.
//!
//! Implements:
//! - `rutina routine create <file>`          -- replay a routine file through a new wizard session
//! - `rutina routine update <file>`          -- replay a routine file over an existing routine
//! - `rutina routine show [<id|file>]`       -- list routines or show one with its days
//! - `rutina routine export <id|file>`       -- render a stored routine as a routine file
//! - `rutina routine import <json>`          -- create a routine from a document export

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use rutina_core::decode::decode_routine_json;
use rutina_core::routine_file::{
    RoutineFile, export_routine_file, parse_routine_file, render_routine_file, replay_routine_file,
};
use rutina_core::store::{PgStore, RoutineStore};
use rutina_core::wizard::WizardOutcome;
use rutina_core::{WizardConfig, WizardController};
use rutina_db::queries::{clients as client_queries, routines as routine_queries};

use crate::RoutineCommands;
use crate::resolve::{resolve_routine_id, write_routine_id_to_file};

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `RoutineCommands` variant to the appropriate handler.
pub async fn run_routine_command(
    command: RoutineCommands,
    pool: &PgPool,
    coach_id: Uuid,
    wizard: &WizardConfig,
) -> Result<()> {
    let store = PgStore::new(pool.clone()).with_day_name_prefix(wizard.day_name_prefix.clone());
    match command {
        RoutineCommands::Create { file } => cmd_create(&store, coach_id, wizard, &file).await,
        RoutineCommands::Update { file } => cmd_update(&store, coach_id, wizard, &file).await,
        RoutineCommands::Show { routine } => match routine {
            Some(r) => cmd_show_one(&store, coach_id, &r).await,
            None => cmd_show_all(pool, coach_id).await,
        },
        RoutineCommands::Export { routine, output } => {
            cmd_export(&store, coach_id, &routine, output.as_deref()).await
        }
        RoutineCommands::Import { file } => cmd_import(pool, &store, coach_id, &file).await,
    }
}

fn read_routine_file(path: &str) -> Result<RoutineFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read routine file: {path}"))?;
    parse_routine_file(&content).with_context(|| format!("failed to parse routine file: {path}"))
}

/// Load reference data and replay `file` through `wizard`, then save.
async fn replay_and_save(store: &PgStore, wizard: &mut WizardController, file: &RoutineFile) -> Result<Uuid> {
    wizard.load_reference_data(store, store).await;
    let reference = wizard.reference();
    if let Some(err) = &reference.catalog_error {
        bail!("failed to load exercise catalog: {err}");
    }
    if let Some(err) = &reference.clients_error {
        bail!("failed to load clients: {err}");
    }
    if !reference.clients.iter().any(|c| c.id == file.routine.client) {
        bail!(
            "client {} not found; use `rutina client list` to see your clients",
            file.routine.client
        );
    }

    replay_routine_file(wizard, file)?;

    match wizard.save(store).await? {
        WizardOutcome::Saved { routine_id } => Ok(routine_id),
        WizardOutcome::Cancelled => bail!("wizard session was cancelled"),
    }
}

// -----------------------------------------------------------------------
// rutina routine create <file>
// -----------------------------------------------------------------------

async fn cmd_create(store: &PgStore, coach_id: Uuid, config: &WizardConfig, path: &str) -> Result<()> {
    let file = read_routine_file(path)?;
    if let Some(id) = file.routine.id {
        bail!("routine file {path:?} already has id {id}; use `rutina routine update {path}`");
    }

    let mut wizard = WizardController::new(coach_id, config.clone());
    let routine_id = replay_and_save(store, &mut wizard, &file).await?;
    write_routine_id_to_file(path, routine_id)?;
    info!(%routine_id, path, "routine file registered");

    println!("Routine created successfully.");
    println!();
    println!("  Routine ID:  {routine_id}");
    println!("  Name:        {}", file.routine.name);
    println!("  Days:        {}", file.days.len());
    println!();
    println!("Wrote id back to {path}.");
    Ok(())
}

// -----------------------------------------------------------------------
// rutina routine update <file>
// -----------------------------------------------------------------------

async fn cmd_update(store: &PgStore, coach_id: Uuid, config: &WizardConfig, path: &str) -> Result<()> {
    let file = read_routine_file(path)?;
    let Some(routine_id) = file.routine.id else {
        bail!("routine file {path:?} has no id; use `rutina routine create {path}` first");
    };

    let mut wizard = WizardController::load_for_edit(coach_id, routine_id, config.clone(), store).await?;
    let before = wizard.days().len();
    replay_and_save(store, &mut wizard, &file).await?;

    println!("Routine {routine_id} updated.");
    println!("  Days:  {before} -> {}", file.days.len());
    Ok(())
}

// -----------------------------------------------------------------------
// rutina routine show
// -----------------------------------------------------------------------

async fn cmd_show_all(pool: &PgPool, coach_id: Uuid) -> Result<()> {
    let routines = routine_queries::list_routines_for_coach(pool, coach_id).await?;

    if routines.is_empty() {
        println!("No routines found. Use `rutina routine create <file>` to create one.");
        return Ok(());
    }

    let id_w = 36;
    let name_w = routines.iter().map(|r| r.name.chars().count()).max().unwrap_or(4).max(4);

    println!("{:<id_w$}  {:<name_w$}  DAYS  WEEKS  START", "ID", "NAME");
    for r in &routines {
        println!(
            "{:<id_w$}  {:<name_w$}  {:>4}  {:>5}  {}",
            r.id,
            r.name,
            r.training_days_count,
            r.duration_weeks,
            r.start_date.format("%Y-%m-%d"),
        );
    }
    Ok(())
}

async fn cmd_show_one(store: &PgStore, coach_id: Uuid, input: &str) -> Result<()> {
    let routine_id = resolve_routine_id(input)?;
    let routine = store
        .get_routine_with_days(coach_id, routine_id)
        .await?
        .with_context(|| format!("routine {routine_id} not found"))?;
    let header = &routine.header;

    println!("Routine: {}", header.name);
    println!("  ID:         {}", routine.id);
    println!("  Client:     {}", header.client_id);
    if !header.objective.is_empty() {
        println!("  Objective:  {}", header.objective);
    }
    println!(
        "  Dates:      {} -> {} ({} weeks)",
        header.start_date.format("%Y-%m-%d"),
        header.end_date.format("%Y-%m-%d"),
        header.duration_weeks
    );
    if let Some(notes) = &header.notes {
        println!("  Notes:      {notes}");
    }

    for day in &routine.days {
        println!();
        let name = day.day_name.as_deref().unwrap_or_default();
        println!("  [{}] {name}", day.day_number());
        if !day.muscle_groups().is_empty() {
            println!("    Muscle groups: {}", day.muscle_groups().join(", "));
        }
        for a in day.exercises() {
            let superset = if a.is_superset { "  (superset)" } else { "" };
            println!(
                "    {}. {}  {} x {}  rest {}{superset}",
                a.order() + 1,
                a.exercise_name,
                a.sets,
                a.reps,
                a.rest
            );
            if let Some(notes) = &a.notes {
                println!("       {notes}");
            }
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------
// rutina routine export
// -----------------------------------------------------------------------

async fn cmd_export(store: &PgStore, coach_id: Uuid, input: &str, output: Option<&str>) -> Result<()> {
    let routine_id = resolve_routine_id(input)?;
    let routine = store
        .get_routine_with_days(coach_id, routine_id)
        .await?
        .with_context(|| format!("routine {routine_id} not found"))?;

    let content = render_routine_file(&export_routine_file(&routine))
        .context("failed to serialize routine to TOML")?;

    match output {
        Some(path) => {
            std::fs::write(path, &content).with_context(|| format!("failed to write {path}"))?;
            println!("Exported routine {routine_id} to {path}");
        }
        None => print!("{content}"),
    }
    Ok(())
}

// -----------------------------------------------------------------------
// rutina routine import <json>
// -----------------------------------------------------------------------

async fn cmd_import(pool: &PgPool, store: &PgStore, coach_id: Uuid, path: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read routine document: {path}"))?;
    let imported = decode_routine_json(&content)
        .with_context(|| format!("failed to decode routine document: {path}"))?;

    let client_id = imported.header.client_id;
    match client_queries::get_client(pool, client_id).await? {
        Some(client) if client.coach_id == coach_id => {}
        _ => bail!("client {client_id} not found; use `rutina client list` to see your clients"),
    }

    let routine_id = store
        .create_routine(coach_id, &imported.header, &imported.days)
        .await?;
    info!(%routine_id, source_id = ?imported.source_id, "routine imported");

    println!("Routine imported.");
    println!("  Routine ID:  {routine_id}");
    if let Some(source) = &imported.source_id {
        println!("  Source ID:   {source}");
    }
    println!("  Name:        {}", imported.header.name);
    println!("  Days:        {}", imported.days.len());
    Ok(())
}
