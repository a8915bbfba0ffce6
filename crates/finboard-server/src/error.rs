use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read {path:?}: {source}")]
  ReadImport {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid import document: {0}")]
  ParseImport(#[from] finboard_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("http client error: {0}")]
  HttpClient(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
