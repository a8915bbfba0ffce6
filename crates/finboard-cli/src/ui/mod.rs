//! TUI rendering — orchestrates all panes.

pub mod chart;
pub mod table;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph, Tabs},
};

use crate::app::{App, View};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: tabs, company header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // tabs
      Constraint::Length(2), // company
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_tabs(f, rows[0], app);
  draw_company(f, rows[1], app);
  match app.view {
    View::Table => table::draw(f, rows[2], app),
    View::Chart => chart::draw(f, rows[2], app),
  }
  draw_status(f, rows[3], app);
}

// ─── Tabs ─────────────────────────────────────────────────────────────────────

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(0), Constraint::Length(date.len() as u16 + 1)])
    .split(area);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  f.render_widget(block, area);

  let titles: Vec<Line> = app
    .tickers
    .iter()
    .enumerate()
    .map(|(i, t)| Line::from(format!("{} {t}", i + 1)))
    .collect();
  let tabs = Tabs::new(titles)
    .select(app.current)
    .style(Style::default().fg(Color::White))
    .highlight_style(
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )
    .divider("│");
  f.render_widget(tabs, cols[0]);

  f.render_widget(
    Paragraph::new(Span::styled(date, Style::default().fg(Color::Gray))),
    cols[1],
  );
}

// ─── Company header ──────────────────────────────────────────────────────────

fn draw_company(f: &mut Frame, area: Rect, app: &App) {
  let lines = match (&app.metadata, app.current_ticker()) {
    (Some(meta), _) => vec![
      Line::from(vec![
        Span::styled(
          format!(" {} ", meta.company_name),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("({})", meta.ticker), Style::default().fg(Color::DarkGray)),
      ]),
      Line::from(Span::styled(
        format!(
          " {}",
          meta.investor_relations_url.as_deref().unwrap_or("No investor relations link")
        ),
        Style::default().fg(Color::Blue),
      )),
    ],
    (None, Some(ticker)) => vec![Line::from(Span::styled(
      format!(" {ticker}"),
      Style::default().add_modifier(Modifier::BOLD),
    ))],
    (None, None) => vec![Line::from(" No company selected")],
  };
  f.render_widget(Paragraph::new(lines), area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.view {
    View::Chart if app.filter_active => (
      "SEARCH",
      "Type to filter  ↑↓ move  Esc cancel  Enter select",
    ),
    View::Table => (
      "TABLE",
      "↑↓/jk scroll  Tab/1-9 company  c chart  r reload  q quit",
    ),
    View::Chart => (
      "CHART",
      "↑↓/jk metric  / search  s summary  Tab/1-9 company  t table  r reload  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
