//! finboard-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite fact store, and serves the JSON API over HTTP.
//!
//! # Loading data
//!
//! ```
//! finboard-server --import companies/asml.json
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use finboard_server::{
  ServerConfig, import::run_import, summary::ConfiguredSummarizer,
};
use finboard_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "finboard API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load a company JSON document into the store and exit.
  #[arg(long, value_name = "FILE")]
  import: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("FINBOARD").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Import mode: load every file and exit without serving.
  if !cli.import.is_empty() {
    for path in &cli.import {
      let report = run_import(&store, path)
        .await
        .with_context(|| format!("failed to import {path:?}"))?;
      println!("{}: {} facts", report.ticker, report.facts_written);
    }
    return Ok(());
  }

  let summarizer = ConfiguredSummarizer::from_config(&server_cfg)
    .context("failed to build summary client")?;
  if !summarizer.is_enabled() {
    tracing::warn!("no openai_api_key configured; summaries are disabled");
  }

  let app = finboard_server::app(&server_cfg, Arc::new(store), Arc::new(summarizer));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
