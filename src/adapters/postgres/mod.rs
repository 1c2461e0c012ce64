//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! - `PostgresSessionRepository` - Session aggregate persistence
//! - `PostgresMessageLog` - Append-only turn log with atomic sequencing
//! - `PostgresTemplateReader` - Template documents stored as JSONB

mod message_log;
mod session_repository;
mod template_reader;

pub use message_log::PostgresMessageLog;
pub use session_repository::PostgresSessionRepository;
pub use template_reader::PostgresTemplateReader;

use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Maps a driver error to a `DatabaseError` naming the failed action.
fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {}: {}", action, e),
    )
}

/// Reads a typed column, mapping decode failures to `DatabaseError`.
fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get {}: {}", name, e),
        )
    })
}
