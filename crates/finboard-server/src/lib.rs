//! HTTP server assembly for finboard.
//!
//! Wires configuration, the SQLite store and the summarizer into the
//! [`finboard_api`] router, adding request tracing and CORS.

pub mod error;
pub mod import;
pub mod summary;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use finboard_api::{ApiState, api_router};
use finboard_core::{
  pivot::{ColumnOrder, DEFAULT_PINNED_YEAR},
  store::FactStore,
  summary::Summarizer,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FINBOARD_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  /// Year shown as the first table column. `0` disables pinning.
  #[serde(default = "default_pinned_year")]
  pub pinned_year:          i32,
  /// Summaries are disabled when unset.
  #[serde(default)]
  pub openai_api_key:       Option<String>,
  #[serde(default = "default_openai_base_url")]
  pub openai_base_url:      String,
  #[serde(default = "default_openai_model")]
  pub openai_model:         String,
  #[serde(default = "default_summary_timeout_secs")]
  pub summary_timeout_secs: u64,
  #[serde(default = "default_cors_permissive")]
  pub cors_permissive:      bool,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 3001 }
fn default_store_path() -> PathBuf { PathBuf::from("data.sqlite") }
fn default_pinned_year() -> i32 { DEFAULT_PINNED_YEAR }
fn default_openai_base_url() -> String { "https://api.openai.com/v1".to_owned() }
fn default_openai_model() -> String { "gpt-4o".to_owned() }
fn default_summary_timeout_secs() -> u64 { 20 }
fn default_cors_permissive() -> bool { true }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 default_host(),
      port:                 default_port(),
      store_path:           default_store_path(),
      pinned_year:          default_pinned_year(),
      openai_api_key:       None,
      openai_base_url:      default_openai_base_url(),
      openai_model:         default_openai_model(),
      summary_timeout_secs: default_summary_timeout_secs(),
      cors_permissive:      default_cors_permissive(),
    }
  }
}

impl ServerConfig {
  pub fn column_order(&self) -> ColumnOrder { ColumnOrder::from_config(self.pinned_year) }

  /// The configured API key, ignoring blank values.
  pub fn api_key(&self) -> Option<&str> {
    self
      .openai_api_key
      .as_deref()
      .map(str::trim)
      .filter(|k| !k.is_empty())
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application: the API nested under `/api`, with request
/// tracing and (optionally) permissive CORS for browser clients.
pub fn app<S, M>(config: &ServerConfig, store: Arc<S>, summarizer: Arc<M>) -> Router
where
  S: FactStore + 'static,
  M: Summarizer + 'static,
{
  let state = ApiState::new(store, summarizer, config.column_order());
  let router = Router::new()
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http());

  if config.cors_permissive {
    router.layer(CorsLayer::permissive())
  } else {
    router
  }
}
