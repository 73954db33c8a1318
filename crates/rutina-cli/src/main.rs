mod client_cmds;
mod config;
mod exercise_cmds;
mod resolve;
mod routine_cmds;
#[cfg(test)]
mod test_util;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use rutina_db::config::DbConfig;
use rutina_db::pool;

use config::RutinaConfig;

#[derive(Parser)]
#[command(name = "rutina", about = "Training routine planning for coaches")]
struct Cli {
    /// Database URL (overrides RUTINA_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Acting coach ID (overrides RUTINA_COACH_ID env var)
    #[arg(long, global = true)]
    coach_id: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a rutina config file with a new coach id (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the rutina database (requires config file or env vars)
    DbInit,
    /// Client management
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },
    /// Exercise catalog management
    Exercise {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Routine management
    Routine {
        #[command(subcommand)]
        command: RoutineCommands,
    },
}

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Register a client
    Add {
        /// Client name
        name: String,
        /// Client email
        email: String,
    },
    /// List your clients
    List,
}

#[derive(Subcommand)]
pub enum ExerciseCommands {
    /// Add an exercise to the catalog
    Add {
        /// Exercise name
        name: String,
        /// Muscle group the exercise trains
        #[arg(long)]
        muscle_group: String,
        /// Image URL
        #[arg(long)]
        image_url: Option<String>,
        /// Video URL
        #[arg(long)]
        video_url: Option<String>,
        /// Add to the library shared by all coaches instead of your own catalog
        #[arg(long)]
        global: bool,
    },
    /// List the catalog visible to you
    List {
        /// Only show exercises for this muscle group
        #[arg(long)]
        muscle_group: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RoutineCommands {
    /// Create a routine from a routine file
    Create {
        /// Path to the routine TOML file
        file: String,
    },
    /// Replace a routine's details and days from its routine file
    Update {
        /// Path to a routine TOML file with [routine].id set
        file: String,
    },
    /// Show routine details (or list all routines)
    Show {
        /// Routine ID or routine file (omit to list all)
        routine: Option<String>,
    },
    /// Export a routine as a routine file
    Export {
        /// Routine ID or routine file
        routine: String,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Create a routine from a JSON document export
    Import {
        /// Path to the JSON document
        file: String,
    },
}

/// Execute the `rutina init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let coach_id = Uuid::new_v4();
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        coach: config::CoachSection { id: coach_id },
        wizard: config::WizardSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  coach.id = {coach_id}");
    println!();
    println!("Next: run `rutina db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `rutina db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &RutinaConfig) -> anyhow::Result<()> {
    println!("Initializing rutina database...");

    match pool::ensure_database_exists(&resolved.db_config).await? {
        pool::Bootstrap::Created => println!("Created database."),
        pool::Bootstrap::Existing => println!("Database already exists."),
    }
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Rows:");
    for (label, count) in counts.rows() {
        println!("  {label:<24} {count}");
    }

    db_pool.close().await;

    println!("rutina db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Init { db_url, force } = &cli.command {
        return cmd_init(db_url, *force);
    }

    let resolved = RutinaConfig::resolve(cli.database_url.as_deref(), cli.coach_id)?;

    match cli.command {
        Commands::Init { .. } => {}
        Commands::DbInit => {
            cmd_db_init(&resolved).await?;
        }
        Commands::Client { command } => {
            let coach_id = resolved.coach_id()?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = client_cmds::run_client_command(command, &db_pool, coach_id).await;
            db_pool.close().await;
            result?;
        }
        Commands::Exercise { command } => {
            let coach_id = resolved.coach_id()?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = exercise_cmds::run_exercise_command(command, &db_pool, coach_id).await;
            db_pool.close().await;
            result?;
        }
        Commands::Routine { command } => {
            let coach_id = resolved.coach_id()?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result =
                routine_cmds::run_routine_command(command, &db_pool, coach_id, &resolved.wizard).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
