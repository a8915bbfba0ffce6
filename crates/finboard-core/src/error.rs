//! Error types for `finboard-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid metric label {0:?}; expected \"<statement type>: <metric>\"")]
  InvalidMetricLabel(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
