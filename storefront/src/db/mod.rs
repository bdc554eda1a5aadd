// storefront/src/db/mod.rs

//! PostgreSQL implementations of the storefront's `Backend` and
//! `AuthProvider`, plus catalog seeding.

mod auth;
mod backend;
mod rows;
pub mod seed;

pub use auth::PgAuthProvider;
pub use backend::PgBackend;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, instrument};
use vitrine::VitrineError;

const SCHEMA: &str = include_str!("../../schema.sql");

/// SQLSTATE codes Postgres uses for transactions that lost a race.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Maps driver errors onto the domain error. Serialization failures and
/// deadlocks become `Conflict` so the reservation loop retries them.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> VitrineError {
  if let sqlx::Error::Database(db_err) = &err {
    if matches!(db_err.code().as_deref(), Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)) {
      return VitrineError::Conflict(db_err.message().to_string());
    }
  }
  VitrineError::Backend {
    source: anyhow::Error::new(err),
  }
}

#[instrument(name = "db::connect", skip(database_url), err(Display))]
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
  let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
  info!("Successfully connected to the database.");
  Ok(pool)
}

/// Creates any missing tables. Every statement is idempotent.
#[instrument(name = "db::ensure_schema", skip(pool), err(Display))]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
  for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
    sqlx::query(statement).execute(pool).await?;
  }
  info!("Database schema is up to date.");
  Ok(())
}
