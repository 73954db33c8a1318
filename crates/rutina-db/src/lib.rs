//! Postgres persistence for rutina: schema, row models and queries.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
