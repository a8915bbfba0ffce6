//! Application state machine and event dispatcher.

use std::sync::Arc;

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use finboard_core::{
  company::CompanyMetadata,
  fact::FactRecord,
  pivot::{ColumnOrder, PivotTable, pivot_with},
  series::{MetricKey, TimeSeries, metric_keys, time_series},
  summary::{FALLBACK_MESSAGE, MetricSummary},
};
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::{cache::MetaCache, client::ApiClient};

// ─── View ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  /// Pivoted statement table.
  Table,
  /// Metric picker, line chart and summary box.
  Chart,
}

// ─── Summary lifecycle ───────────────────────────────────────────────────────

type SummaryReply = anyhow::Result<MetricSummary>;

pub enum SummaryState {
  Idle,
  Loading {
    key: MetricKey,
    rx:  oneshot::Receiver<SummaryReply>,
  },
  Ready {
    key:  MetricKey,
    text: String,
  },
  Failed {
    key: MetricKey,
  },
}

impl SummaryState {
  /// Text for the summary box, or `None` when nothing was requested.
  pub fn display(&self) -> Option<&str> {
    match self {
      SummaryState::Idle => None,
      SummaryState::Loading { .. } => Some("Generating overview…"),
      SummaryState::Ready { text, .. } => Some(text),
      SummaryState::Failed { .. } => Some(FALLBACK_MESSAGE),
    }
  }

  fn key(&self) -> Option<&MetricKey> {
    match self {
      SummaryState::Idle => None,
      SummaryState::Loading { key, .. }
      | SummaryState::Ready { key, .. }
      | SummaryState::Failed { key } => Some(key),
    }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub view: View,

  /// Ticker tabs, in display order.
  pub tickers: Vec<String>,

  /// Index into `tickers` of the visible tab.
  pub current: usize,

  /// Metadata of the visible ticker, if it could be loaded.
  pub metadata: Option<CompanyMetadata>,

  /// Raw facts of the visible ticker.
  pub records: Vec<FactRecord>,

  /// `records` pivoted with `column_order`.
  pub table: PivotTable,

  pub column_order: ColumnOrder,

  /// First visible line of the table body.
  pub table_scroll: usize,

  /// Distinct chartable metrics of the visible ticker.
  pub metrics: Vec<MetricKey>,

  /// Cursor position within the *filtered* metric list.
  pub metric_cursor: usize,

  /// Metric shown in the chart.
  pub selected_metric: Option<MetricKey>,

  /// Series of `selected_metric`.
  pub series: TimeSeries,

  /// Current fuzzy-filter string for the metric picker.
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  pub summary: SummaryState,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  meta_cache: MetaCache,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(
    client: ApiClient,
    tickers: Vec<String>,
    column_order: ColumnOrder,
    meta_cache: MetaCache,
  ) -> Self {
    Self {
      view: View::Table,
      tickers,
      current: 0,
      metadata: None,
      records: Vec::new(),
      table: PivotTable::default(),
      column_order,
      table_scroll: 0,
      metrics: Vec::new(),
      metric_cursor: 0,
      selected_metric: None,
      series: TimeSeries::default(),
      filter: String::new(),
      filter_active: false,
      summary: SummaryState::Idle,
      status_msg: String::new(),
      meta_cache,
      client: Arc::new(client),
    }
  }

  pub fn current_ticker(&self) -> Option<&str> {
    self.tickers.get(self.current).map(String::as_str)
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fill the tab list from the server unless tickers were given up front,
  /// then load the first tab.
  pub async fn load_tickers(&mut self) -> anyhow::Result<()> {
    if self.tickers.is_empty() {
      self.status_msg = "Loading companies…".into();
      let companies = self.client.list_companies().await?;
      for company in companies {
        self.meta_cache.insert(company.clone(), Utc::now());
        self.tickers.push(company.ticker);
      }
    }
    if self.tickers.is_empty() {
      self.status_msg = "No companies in the store.".into();
      return Ok(());
    }
    self.load_current().await;
    Ok(())
  }

  /// Load metadata (through the cache) and facts for the visible ticker.
  ///
  /// Failures are reported in the status bar; the previous tab's data is
  /// cleared so stale numbers are never shown under the wrong header.
  pub async fn load_current(&mut self) {
    let Some(ticker) = self.current_ticker().map(str::to_owned) else {
      return;
    };
    self.status_msg = format!("Loading {ticker}…");

    self.metadata = match self.meta_cache.get(&ticker, Utc::now()) {
      Some(meta) => Some(meta.clone()),
      None => match self.client.metadata(&ticker).await {
        Ok(meta) => {
          self.meta_cache.insert(meta.clone(), Utc::now());
          Some(meta)
        }
        Err(e) => {
          tracing::warn!(%ticker, error = %e, "metadata request failed");
          None
        }
      },
    };

    match self.client.company_facts(&ticker).await {
      Ok(facts) => {
        self.set_records(facts.data);
        self.status_msg = String::new();
      }
      Err(e) => {
        tracing::warn!(%ticker, error = %e, "facts request failed");
        self.set_records(Vec::new());
        self.status_msg = format!("Error: {e}");
      }
    }
  }

  /// Drop the cached metadata of the visible ticker and load it again.
  pub async fn reload(&mut self) {
    if let Some(ticker) = self.current_ticker().map(str::to_owned) {
      self.meta_cache.invalidate(&ticker);
    }
    self.load_current().await;
  }

  /// Replace the visible facts and everything derived from them.
  pub fn set_records(&mut self, records: Vec<FactRecord>) {
    self.table = pivot_with(&records, self.column_order);
    self.metrics = metric_keys(&records);
    self.records = records;
    self.table_scroll = 0;
    self.metric_cursor = 0;
    self.filter.clear();
    self.filter_active = false;
    self.summary = SummaryState::Idle;
    let first = self.metrics.first().cloned();
    self.select_metric(first);
  }

  fn select_metric(&mut self, key: Option<MetricKey>) {
    self.series = key
      .as_ref()
      .map(|k| time_series(&self.records, k))
      .unwrap_or_default();
    if self.summary.key() != key.as_ref() {
      self.summary = SummaryState::Idle;
    }
    self.selected_metric = key;
  }

  // ── Summary ───────────────────────────────────────────────────────────────

  /// Ask the server for a summary of the selected metric on a background
  /// task. The result is picked up by [`App::poll_summary`].
  pub fn request_summary(&mut self) {
    let (Some(ticker), Some(key)) = (self.current_ticker(), self.selected_metric.clone())
    else {
      return;
    };
    if matches!(&self.summary, SummaryState::Loading { key: k, .. } if *k == key) {
      return;
    }

    let (tx, rx) = oneshot::channel();
    let client = Arc::clone(&self.client);
    let ticker = ticker.to_owned();
    let request_key = key.clone();
    tokio::spawn(async move {
      let reply = client.summary(&ticker, &request_key).await;
      // The receiver is gone if the user moved on; nothing to do.
      let _ = tx.send(reply);
    });
    self.summary = SummaryState::Loading { key, rx };
  }

  /// Move a finished summary request into `Ready` or `Failed`.
  pub fn poll_summary(&mut self) {
    let SummaryState::Loading { key, rx } = &mut self.summary else {
      return;
    };
    let next = match rx.try_recv() {
      Err(TryRecvError::Empty) => return,
      Ok(Ok(summary)) => SummaryState::Ready { key: key.clone(), text: summary.summary },
      Ok(Err(e)) => {
        tracing::warn!(metric = %key, error = %e, "summary request failed");
        SummaryState::Failed { key: key.clone() }
      }
      Err(TryRecvError::Closed) => SummaryState::Failed { key: key.clone() },
    };
    self.summary = next;
  }

  // ── Filtered metrics ──────────────────────────────────────────────────────

  /// Metrics that match the current filter query.
  pub fn filtered_metrics(&self) -> Vec<&MetricKey> {
    if self.filter.is_empty() {
      return self.metrics.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .metrics
      .iter()
      .filter(|k| matcher.fuzzy_match(&k.label(), &self.filter).is_some())
      .collect()
  }

  fn select_cursor_metric(&mut self) {
    let key = self.filtered_metrics().get(self.metric_cursor).map(|k| (*k).clone());
    if key.is_some() {
      self.select_metric(key);
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Tabs
      KeyCode::Tab => self.switch_tab((self.current + 1) % self.tickers.len().max(1)).await,
      KeyCode::BackTab => {
        let len = self.tickers.len().max(1);
        self.switch_tab((self.current + len - 1) % len).await;
      }
      KeyCode::Char(c @ '1'..='9') => {
        let idx = c as usize - '1' as usize;
        if idx < self.tickers.len() {
          self.switch_tab(idx).await;
        }
      }

      // Views
      KeyCode::Char('t') => self.view = View::Table,
      KeyCode::Char('c') => self.view = View::Chart,
      KeyCode::Char('v') => {
        self.view = match self.view {
          View::Table => View::Chart,
          View::Chart => View::Table,
        }
      }

      KeyCode::Char('r') => self.reload().await,

      _ => match self.view {
        View::Table => self.handle_table_key(key),
        View::Chart => self.handle_chart_key(key),
      },
    }
    Ok(true)
  }

  async fn switch_tab(&mut self, idx: usize) {
    if idx == self.current || idx >= self.tickers.len() {
      return;
    }
    self.current = idx;
    self.load_current().await;
  }

  fn handle_table_key(&mut self, key: KeyEvent) {
    let max = self.table_lines().saturating_sub(1);
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        self.table_scroll = (self.table_scroll + 1).min(max);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.table_scroll = self.table_scroll.saturating_sub(1);
      }
      KeyCode::PageDown => self.table_scroll = (self.table_scroll + 10).min(max),
      KeyCode::PageUp => self.table_scroll = self.table_scroll.saturating_sub(10),
      KeyCode::Home | KeyCode::Char('g') => self.table_scroll = 0,
      _ => {}
    }
  }

  /// Number of body lines in the table: one per section header plus rows.
  pub fn table_lines(&self) -> usize { self.table.sections.len() + self.table.row_count() }

  fn handle_chart_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.filtered_metrics().len();
        if self.metric_cursor + 1 < len {
          self.metric_cursor += 1;
          self.select_cursor_metric();
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.metric_cursor > 0 {
          self.metric_cursor -= 1;
          self.select_cursor_metric();
        }
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.metric_cursor = 0;
      }
      KeyCode::Char('s') | KeyCode::Enter => self.request_summary(),
      KeyCode::Esc => {
        self.filter.clear();
        self.metric_cursor = self
          .selected_metric
          .as_ref()
          .and_then(|sel| self.metrics.iter().position(|k| k == sel))
          .unwrap_or(0);
      }
      _ => {}
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.metric_cursor = 0;
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.metric_cursor = 0;
        self.select_cursor_metric();
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.metric_cursor = 0;
      }
      KeyCode::Down => {
        if self.metric_cursor + 1 < self.filtered_metrics().len() {
          self.metric_cursor += 1;
        }
      }
      KeyCode::Up => self.metric_cursor = self.metric_cursor.saturating_sub(1),
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.metric_cursor = 0;
      }
      _ => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::KeyEventKind;

  use super::*;

  fn app() -> App {
    App::new(
      ApiClient::new("http://127.0.0.1:9").unwrap(),
      vec!["ASML".into()],
      ColumnOrder::default(),
      MetaCache::default(),
    )
  }

  fn record(year: i32, statement: &str, metric: &str, value: Option<f64>) -> FactRecord {
    FactRecord {
      year,
      statement_type: statement.into(),
      metric: metric.into(),
      value,
    }
  }

  fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
  }

  fn loaded() -> App {
    let mut app = app();
    app.set_records(vec![
      record(2023, "Income Statement", "Revenue", Some(5_000_000.0)),
      record(2024, "Income Statement", "Revenue", Some(7_000_000.0)),
      record(2024, "Income Statement", "Net Income", Some(1_000_000.0)),
      record(2024, "Balance Sheet", "Total Assets", Some(9_000_000.0)),
      record(2019, "Historical", "Revenue", Some(1.0)),
    ]);
    app
  }

  #[test]
  fn records_drive_table_and_metrics() {
    let app = loaded();
    assert_eq!(app.table.columns, vec!["2024", "2023"]);
    assert_eq!(app.table_lines(), 2 + 3);
    assert_eq!(app.metrics.len(), 3);
    assert_eq!(
      app.selected_metric,
      Some(MetricKey::new("Income Statement", "Revenue"))
    );
    assert_eq!(app.series.len(), 2);
  }

  #[test]
  fn fuzzy_filter_narrows_metrics() {
    let mut app = loaded();
    app.filter = "assets".into();
    let labels: Vec<String> = app.filtered_metrics().iter().map(|k| k.label()).collect();
    assert_eq!(labels, vec!["Balance Sheet: Total Assets"]);
  }

  #[tokio::test]
  async fn chart_navigation_selects_metric() {
    let mut app = loaded();
    app.handle_key(press(KeyCode::Char('c'))).await.unwrap();
    assert_eq!(app.view, View::Chart);

    app.handle_key(press(KeyCode::Char('j'))).await.unwrap();
    assert_eq!(
      app.selected_metric,
      Some(MetricKey::new("Income Statement", "Net Income"))
    );
    assert_eq!(app.series.len(), 1);
  }

  #[tokio::test]
  async fn filter_enter_selects_first_match() {
    let mut app = loaded();
    app.view = View::Chart;
    app.handle_key(press(KeyCode::Char('/'))).await.unwrap();
    // `t` and `c` switch views outside filter mode.
    for c in "total".chars() {
      assert!(app.handle_key(press(KeyCode::Char(c))).await.unwrap());
    }
    assert!(app.filter_active);
    assert_eq!(app.view, View::Chart);
    assert_eq!(app.filter, "total");
    app.handle_key(press(KeyCode::Enter)).await.unwrap();

    assert!(!app.filter_active);
    assert_eq!(
      app.selected_metric,
      Some(MetricKey::new("Balance Sheet", "Total Assets"))
    );
  }

  #[tokio::test]
  async fn q_quits_outside_filter_mode() {
    let mut app = loaded();
    assert!(!app.handle_key(press(KeyCode::Char('q'))).await.unwrap());
  }

  #[test]
  fn finished_summary_becomes_ready() {
    let mut app = loaded();
    let key = MetricKey::new("Income Statement", "Revenue");
    let (tx, rx) = oneshot::channel();
    app.summary = SummaryState::Loading { key: key.clone(), rx };

    app.poll_summary();
    assert_eq!(app.summary.display(), Some("Generating overview…"));

    tx.send(Ok(MetricSummary {
      metric:  key.label(),
      summary: "Revenue grew 40%.".into(),
    }))
    .unwrap();
    app.poll_summary();
    assert_eq!(app.summary.display(), Some("Revenue grew 40%."));
  }

  #[test]
  fn failed_summary_shows_fallback() {
    let mut app = loaded();
    let key = MetricKey::new("Income Statement", "Revenue");

    let (tx, rx) = oneshot::channel();
    app.summary = SummaryState::Loading { key: key.clone(), rx };
    tx.send(Err(anyhow::anyhow!("503"))).unwrap();
    app.poll_summary();
    assert_eq!(app.summary.display(), Some(FALLBACK_MESSAGE));

    let (tx, rx) = oneshot::channel::<SummaryReply>();
    app.summary = SummaryState::Loading { key, rx };
    drop(tx);
    app.poll_summary();
    assert_eq!(app.summary.display(), Some(FALLBACK_MESSAGE));

    // Data stays usable.
    assert_eq!(app.table.row_count(), 3);
  }

  #[test]
  fn selecting_another_metric_clears_summary() {
    let mut app = loaded();
    app.summary = SummaryState::Ready {
      key:  MetricKey::new("Income Statement", "Revenue"),
      text: "old".into(),
    };
    app.select_metric(Some(MetricKey::new("Balance Sheet", "Total Assets")));
    assert!(app.summary.display().is_none());
  }

  #[test]
  fn table_scroll_is_clamped() {
    let mut app = loaded();
    for _ in 0..20 {
      app.handle_table_key(press(KeyCode::Down));
    }
    assert_eq!(app.table_scroll, app.table_lines() - 1);
    app.handle_table_key(press(KeyCode::Home));
    assert_eq!(app.table_scroll, 0);
  }
}
