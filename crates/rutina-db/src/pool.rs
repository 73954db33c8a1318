//! Connection pools, database bootstrap and the embedded migrator.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, FromRow, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/rutina-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Open a pool on `url` holding at most `max_connections`.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(url)
        .await
        .with_context(|| format!("failed to connect to database at {url}"))
}

/// Pool for the configured routine database.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    connect(&config.database_url, 5).await
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;
    info!(migrations = MIGRATOR.iter().count(), "schema up to date");
    Ok(())
}

/// `CREATE DATABASE` and `DROP DATABASE` take no bind parameters, so the
/// name is spliced in and must be a plain identifier.
pub fn is_valid_database_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// What [`ensure_database_exists`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    Created,
    Existing,
}

fn checked_name(config: &DbConfig) -> Result<&str> {
    let name = config
        .database_name()
        .context("could not determine database name from URL")?;
    if !is_valid_database_name(name) {
        anyhow::bail!("database name {name:?} contains invalid characters");
    }
    Ok(name)
}

/// Create the configured database through the maintenance database if it
/// is missing.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<Bootstrap> {
    let name = checked_name(config)?;
    let maint = connect(&config.maintenance_url(), 1).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(&maint)
            .await
            .context("failed to query pg_database")?;

    let outcome = if exists {
        Bootstrap::Existing
    } else {
        maint
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .with_context(|| format!("failed to create database {name}"))?;
        Bootstrap::Created
    };
    maint.close().await;

    info!(db = name, ?outcome, "database bootstrap");
    Ok(outcome)
}

/// Drop the configured database, terminating its open connections first.
pub async fn drop_database(config: &DbConfig) -> Result<()> {
    let name = checked_name(config)?;
    let maint = connect(&config.maintenance_url(), 1).await?;

    sqlx::query(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
         WHERE datname = $1 AND pid <> pg_backend_pid()",
    )
    .bind(name)
    .execute(&maint)
    .await
    .with_context(|| format!("failed to disconnect sessions on {name}"))?;

    maint
        .execute(format!("DROP DATABASE IF EXISTS {name}").as_str())
        .await
        .with_context(|| format!("failed to drop database {name}"))?;
    maint.close().await;

    debug!(db = name, "database dropped");
    Ok(())
}

/// Row counts shown by `rutina db-init`. Catalog rows are split by owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct TableCounts {
    pub clients: i64,
    pub library_exercises: i64,
    pub coach_exercises: i64,
    pub routines: i64,
    pub training_days: i64,
    pub day_exercises: i64,
}

impl TableCounts {
    /// Labelled counts in display order.
    pub fn rows(&self) -> [(&'static str, i64); 6] {
        [
            ("clients", self.clients),
            ("exercises (library)", self.library_exercises),
            ("exercises (coach-owned)", self.coach_exercises),
            ("routines", self.routines),
            ("training days", self.training_days),
            ("day exercises", self.day_exercises),
        ]
    }
}

pub async fn table_counts(pool: &PgPool) -> Result<TableCounts> {
    sqlx::query_as::<_, TableCounts>(
        "SELECT \
           (SELECT COUNT(*) FROM clients) AS clients, \
           (SELECT COUNT(*) FROM exercises WHERE coach_id IS NULL) AS library_exercises, \
           (SELECT COUNT(*) FROM exercises WHERE coach_id IS NOT NULL) AS coach_exercises, \
           (SELECT COUNT(*) FROM routines) AS routines, \
           (SELECT COUNT(*) FROM training_days) AS training_days, \
           (SELECT COUNT(*) FROM day_exercises) AS day_exercises",
    )
    .fetch_one(pool)
    .await
    .context("failed to count rows")
}
