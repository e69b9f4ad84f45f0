//! PostgreSQL store backing.

pub mod access;
pub mod connection;
pub mod share;

pub use access::PgAccessLogStore;
pub use connection::create_pool;
pub use share::PgShareLinkStore;

use docvault_core::error::{AppError, ErrorKind};

/// Postgres SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Map an sqlx error into the application taxonomy.
///
/// Unique violations become `Conflict` (token collisions), connection-level
/// failures become `TransientStore` so the service layer can retry, and
/// everything else is an internal error.
pub(crate) fn map_sqlx_err(context: &str, e: sqlx::Error) -> AppError {
    let kind = match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            ErrorKind::Conflict
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_) => ErrorKind::TransientStore,
        _ => ErrorKind::Internal,
    };
    AppError::with_source(kind, format!("{context}: {e}"), e)
}
