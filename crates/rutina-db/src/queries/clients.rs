//! Database query functions for the `clients` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Client;

/// Insert a new client for a coach.
pub async fn insert_client(pool: &PgPool, coach_id: Uuid, name: &str, email: &str) -> Result<Client> {
    let client = sqlx::query_as::<_, Client>(
        "INSERT INTO clients (coach_id, name, email) \
         VALUES ($1, $2, $3) \
         RETURNING *",
    )
    .bind(coach_id)
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await
    .context("failed to insert client")?;

    Ok(client)
}

/// Fetch a client by ID.
pub async fn get_client(pool: &PgPool, id: Uuid) -> Result<Option<Client>> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch client")?;

    Ok(client)
}

/// List a coach's clients, alphabetically.
pub async fn list_clients_for_coach(pool: &PgPool, coach_id: Uuid) -> Result<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(
        "SELECT * FROM clients WHERE coach_id = $1 ORDER BY lower(name), created_at",
    )
    .bind(coach_id)
    .fetch_all(pool)
    .await
    .context("failed to list clients")?;

    Ok(clients)
}
