//! Routine ID resolution and TOML write-back.
//!
//! - [`resolve_routine_id`] accepts either a UUID string or a path to a
//!   routine file. If given a file, it reads the `[routine].id` field.
//! - [`write_routine_id_to_file`] uses `toml_edit` to insert
//!   `id = "..."` into the `[routine]` section without disturbing comments
//!   or formatting.

use std::path::Path;

use anyhow::{Context, Result, bail};
use uuid::Uuid;

use rutina_core::routine_file::RoutineFile;

/// Return the routine UUID named by `input`, either directly or through
/// the `[routine].id` of a routine file.
///
/// Anything ending in `.toml` or containing a path separator is treated
/// as a file path. Otherwise the input is parsed as a UUID, falling back
/// to a file of that name if one exists.
pub fn resolve_routine_id(input: &str) -> Result<Uuid> {
    if looks_like_file_path(input) {
        return read_routine_id_from_file(input);
    }
    match Uuid::parse_str(input) {
        Ok(uuid) => Ok(uuid),
        Err(_) if Path::new(input).is_file() => read_routine_id_from_file(input),
        Err(uuid_err) => Err(uuid_err).with_context(|| {
            format!("invalid routine ID: {input:?} (not a valid UUID and not a file)")
        }),
    }
}

fn looks_like_file_path(input: &str) -> bool {
    input.ends_with(".toml") || input.contains('/')
}

fn read_routine_id_from_file(path: &str) -> Result<Uuid> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read routine file: {path}"))?;

    let file: RoutineFile =
        toml::from_str(&content).with_context(|| format!("failed to parse TOML from {path}"))?;

    match file.routine.id {
        Some(id) => Ok(id),
        None => bail!(
            "routine file {path:?} has no id field in [routine] section.\n\
             Run `rutina routine create {path}` first to register it."
        ),
    }
}

/// Insert `id = "<uuid>"` as the first key of the `[routine]` section,
/// preserving all other content including comments and formatting.
pub fn write_routine_id_to_file(path: &str, routine_id: Uuid) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    let mut doc: toml_edit::DocumentMut = content
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("failed to parse {path} as TOML document"))?;

    let routine_table = doc
        .get_mut("routine")
        .and_then(|v| v.as_table_mut())
        .with_context(|| format!("{path} has no [routine] table"))?;

    let entries: Vec<(String, toml_edit::Item)> = routine_table
        .iter()
        .filter(|(k, _)| *k != "id")
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();

    routine_table.clear();
    routine_table.insert("id", toml_edit::value(routine_id.to_string()));
    for (key, value) in entries {
        routine_table.insert(&key, value);
    }

    std::fs::write(path, doc.to_string()).with_context(|| format!("failed to write {path}"))?;

    Ok(())
}
