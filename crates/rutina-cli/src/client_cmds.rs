//! CLI handlers for `rutina client` subcommands.
//!
//! Implements:
//! - `rutina client add <name> <email>` -- register a client for the coach
//! - `rutina client list`               -- list the coach's clients

use anyhow::{Result, bail};
use sqlx::PgPool;
use uuid::Uuid;

use rutina_db::queries::clients as client_queries;

use crate::ClientCommands;

/// Dispatch a `ClientCommands` variant to the appropriate handler.
pub async fn run_client_command(command: ClientCommands, pool: &PgPool, coach_id: Uuid) -> Result<()> {
    match command {
        ClientCommands::Add { name, email } => cmd_add(pool, coach_id, &name, &email).await,
        ClientCommands::List => cmd_list(pool, coach_id).await,
    }
}

async fn cmd_add(pool: &PgPool, coach_id: Uuid, name: &str, email: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("client name must not be empty");
    }
    let client = client_queries::insert_client(pool, coach_id, name, email.trim()).await?;

    println!("Client added.");
    println!("  ID:     {}", client.id);
    println!("  Name:   {}", client.name);
    println!("  Email:  {}", client.email);
    Ok(())
}

async fn cmd_list(pool: &PgPool, coach_id: Uuid) -> Result<()> {
    let clients = client_queries::list_clients_for_coach(pool, coach_id).await?;

    if clients.is_empty() {
        println!("No clients found. Use `rutina client add <name> <email>` to add one.");
        return Ok(());
    }

    let id_w = 36;
    let name_w = clients.iter().map(|c| c.name.chars().count()).max().unwrap_or(4).max(4);

    println!("{:<id_w$}  {:<name_w$}  EMAIL", "ID", "NAME");
    for client in &clients {
        println!("{:<id_w$}  {:<name_w$}  {}", client.id, client.name, client.email);
    }
    Ok(())
}
