//! Configuration file management for rutina.
//!
//! Provides a TOML-based config file at `~/.config/rutina/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rutina_core::WizardConfig;
use rutina_core::wizard::DEFAULT_DAY_NAME_PREFIX;
use rutina_db::config::DbConfig;

/// Env var naming the acting coach.
pub const COACH_ENV_VAR: &str = "RUTINA_COACH_ID";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub coach: CoachSection,
    #[serde(default)]
    pub wizard: WizardSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CoachSection {
    /// Coach every routine, client and custom exercise is scoped to.
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WizardSection {
    /// Label for unnamed days, e.g. "Día" gives "Día 1".
    #[serde(default = "default_day_name_prefix")]
    pub day_name_prefix: String,
}

impl Default for WizardSection {
    fn default() -> Self {
        Self {
            day_name_prefix: default_day_name_prefix(),
        }
    }
}

fn default_day_name_prefix() -> String {
    DEFAULT_DAY_NAME_PREFIX.to_string()
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the rutina config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/rutina` or `~/.config/rutina`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("rutina");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("rutina")
}

/// Return the path to the rutina config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct RutinaConfig {
    pub db_config: DbConfig,
    coach_id: Option<Uuid>,
    pub wizard: WizardConfig,
}

impl RutinaConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `RUTINA_DATABASE_URL` env > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Coach id: `cli_coach_id` > `RUTINA_COACH_ID` env > `coach.id` > none
    /// - Day name prefix: `wizard.day_name_prefix` > `"Día"`
    pub fn resolve(cli_db_url: Option<&str>, cli_coach_id: Option<Uuid>) -> Result<Self> {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };

        let coach_id = if let Some(id) = cli_coach_id {
            Some(id)
        } else if let Ok(raw) = std::env::var(COACH_ENV_VAR) {
            let id = Uuid::parse_str(raw.trim())
                .with_context(|| format!("{COACH_ENV_VAR} is not a valid UUID: {raw:?}"))?;
            Some(id)
        } else {
            file_config.as_ref().map(|cfg| cfg.coach.id)
        };

        let mut wizard = WizardConfig::default();
        if let Some(ref cfg) = file_config {
            wizard.day_name_prefix = cfg.wizard.day_name_prefix.clone();
        }

        Ok(Self {
            db_config: DbConfig::new(db_url),
            coach_id,
            wizard,
        })
    }

    /// The acting coach, required by every command that reads or writes
    /// coach-scoped data.
    pub fn coach_id(&self) -> Result<Uuid> {
        match self.coach_id {
            Some(id) => Ok(id),
            None => bail!(
                "coach id not found; set {COACH_ENV_VAR} or run `rutina init` to create a config file"
            ),
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
