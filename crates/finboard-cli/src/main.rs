//! `finboard` — terminal dashboard for the finboard API.
//!
//! # Usage
//!
//! ```
//! finboard --url http://localhost:3001
//! finboard --ticker ASML --ticker ROG --pinned-year 0
//! finboard --config ~/.config/finboard/config.toml --log-file /tmp/finboard.log
//! ```

mod app;
mod cache;
mod client;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use cache::{DEFAULT_TTL_SECS, MetaCache};
use clap::Parser;
use client::ApiClient;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use finboard_core::pivot::{ColumnOrder, DEFAULT_PINNED_YEAR};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3001";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "finboard", about = "Terminal dashboard for company financials")]
struct Args {
  /// Path to a TOML config file (url, tickers, meta_ttl_secs, pinned_year).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the finboard server (default: http://localhost:3001).
  #[arg(long, env = "FINBOARD_URL")]
  url: Option<String>,

  /// Ticker to show as a tab; repeat for several. Defaults to every company
  /// the server knows.
  #[arg(short, long = "ticker", value_name = "TICKER")]
  tickers: Vec<String>,

  /// Year shown as the first table column; `0` for plain newest-first.
  #[arg(long)]
  pinned_year: Option<i32>,

  /// Write tracing output to this file. Nothing is logged otherwise.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:           String,
  #[serde(default)]
  tickers:       Vec<String>,
  meta_ttl_secs: Option<u64>,
  pinned_year:   Option<i32>,
}

/// Effective settings after layering flags over the config file over defaults.
#[derive(Debug, PartialEq, Eq)]
struct Settings {
  url:           String,
  tickers:       Vec<String>,
  meta_ttl_secs: u64,
  column_order:  ColumnOrder,
}

fn resolve(args: Args, file: ConfigFile) -> Settings {
  Settings {
    url:           args
      .url
      .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    tickers:       if args.tickers.is_empty() { file.tickers } else { args.tickers },
    meta_ttl_secs: file.meta_ttl_secs.unwrap_or(DEFAULT_TTL_SECS),
    column_order:  ColumnOrder::from_config(
      args
        .pinned_year
        .or(file.pinned_year)
        .unwrap_or(DEFAULT_PINNED_YEAR),
    ),
  }
}

/// Send tracing output to `path`; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
  let file = File::options()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let settings = resolve(args, file_cfg);
  tracing::info!(url = %settings.url, tickers = ?settings.tickers, "starting");

  let client = ApiClient::new(settings.url)?;
  let mut app = App::new(
    client,
    settings.tickers,
    settings.column_order,
    MetaCache::new(settings.meta_ttl_secs),
  );

  // Load initial data before taking over the terminal so connection errors
  // print normally.
  app.load_tickers().await.context("loading companies")?;

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.poll_summary();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
    {
      let cont = app.handle_key(key).await?;
      if !cont {
        break;
      }
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(argv: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("finboard").chain(argv.iter().copied())).unwrap()
  }

  #[test]
  fn defaults_without_flags_or_file() {
    let s = resolve(args(&["--url", DEFAULT_URL]), ConfigFile::default());
    assert_eq!(s.url, DEFAULT_URL);
    assert!(s.tickers.is_empty());
    assert_eq!(s.meta_ttl_secs, 600);
    assert_eq!(s.column_order, ColumnOrder::default());
  }

  #[test]
  fn flags_override_file() {
    let file: ConfigFile = toml::from_str(
      r#"
        url = "http://file:3001"
        tickers = ["ROG"]
        meta_ttl_secs = 30
        pinned_year = 2023
      "#,
    )
    .unwrap();

    let s = resolve(
      args(&["--url", "http://flag:3001", "-t", "ASML", "-t", "ADYEN", "--pinned-year", "0"]),
      file,
    );
    assert_eq!(s.url, "http://flag:3001");
    assert_eq!(s.tickers, vec!["ASML", "ADYEN"]);
    assert_eq!(s.meta_ttl_secs, 30);
    assert_eq!(s.column_order, ColumnOrder::descending());
  }

  #[test]
  fn file_fills_missing_flags() {
    let file: ConfigFile = toml::from_str(
      r#"
        url = "http://file:3001"
        tickers = ["ROG"]
        pinned_year = 2023
      "#,
    )
    .unwrap();

    let s = resolve(args(&["--url", "http://flag:3001"]), file);
    assert_eq!(s.tickers, vec!["ROG"]);
    assert_eq!(s.column_order.pinned_year, Some(2023));
  }
}
