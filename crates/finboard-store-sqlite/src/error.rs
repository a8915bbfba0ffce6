//! Error type for `finboard-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A fact or metadata row failed validation before being written.
  #[error("invalid record: {0}")]
  InvalidRecord(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
