//! Chart view — metric picker, line chart and summary box.

use finboard_core::{pivot::format_cell, series::TimeSeries};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  symbols,
  text::{Line, Span},
  widgets::{
    Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph,
    Wrap,
  },
};

use crate::app::App;

// ─── Data helpers ─────────────────────────────────────────────────────────────

/// `(year, value in millions)` pairs for plotting.
pub fn chart_points(series: &TimeSeries) -> Vec<(f64, f64)> {
  series
    .points
    .iter()
    .map(|p| (f64::from(p.year), p.value / 1_000_000.0))
    .collect()
}

/// Axis bounds with a little headroom; never a zero-width range.
pub fn bounds(values: impl Iterator<Item = f64>, pad_ratio: f64) -> [f64; 2] {
  let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
    (lo.min(v), hi.max(v))
  });
  if !lo.is_finite() || !hi.is_finite() {
    return [0.0, 1.0];
  }
  let span = hi - lo;
  let pad = if span == 0.0 { 1.0 } else { span * pad_ratio };
  [lo - pad, hi + pad]
}

/// `"+12.5%"` style year-over-year change, if it can be computed.
pub fn format_change(series: &TimeSeries) -> Option<String> {
  series.year_over_year().map(|pct| format!("{pct:+.1}%"))
}

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the chart view into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(32), Constraint::Percentage(68)])
    .split(area);

  draw_picker(f, cols[0], app);

  let right = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(8), Constraint::Length(7)])
    .split(cols[1]);

  draw_chart(f, right[0], app);
  draw_summary(f, right[1], app);
}

// ─── Metric picker ───────────────────────────────────────────────────────────

fn draw_picker(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_metrics();
  let total = app.metrics.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Metrics ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Metrics ({}) ", total)
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|key| {
      let style = if app.selected_metric.as_ref() == Some(*key) {
        Style::default().fg(Color::Cyan)
      } else {
        Style::default()
      };
      ListItem::new(Line::from(Span::styled(key.label(), style)))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let mut state = ListState::default();
  state.select(if filtered.is_empty() {
    None
  } else {
    Some(app.metric_cursor)
  });

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}

// ─── Chart ───────────────────────────────────────────────────────────────────

fn draw_chart(f: &mut Frame, area: Rect, app: &App) {
  let title = app
    .selected_metric
    .as_ref()
    .map(|k| format!(" {} ", k.label()))
    .unwrap_or_else(|| " Chart ".to_string());

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if app.series.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No values reported for this metric.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let points = chart_points(&app.series);
  let x = bounds(points.iter().map(|p| p.0), 0.0);
  let y = bounds(points.iter().map(|p| p.1), 0.1);

  let mut headline = Vec::new();
  if let Some(latest) = app.series.latest() {
    headline.push(Span::styled(
      format!("{}: {}m", latest.year, format_cell(Some(latest.value))),
      Style::default().add_modifier(Modifier::BOLD),
    ));
  }
  if let Some(change) = format_change(&app.series) {
    let colour = if change.starts_with('-') { Color::Red } else { Color::Green };
    headline.push(Span::raw("  "));
    headline.push(Span::styled(
      format!("{change} YoY"),
      Style::default().fg(colour),
    ));
  }

  let dataset = Dataset::default()
    .name(
      app
        .selected_metric
        .as_ref()
        .map(|k| k.metric.clone())
        .unwrap_or_default(),
    )
    .marker(symbols::Marker::Braille)
    .graph_type(GraphType::Line)
    .style(Style::default().fg(Color::Cyan))
    .data(&points);

  let x_labels: Vec<Span> = app
    .series
    .points
    .iter()
    .map(|p| Span::raw(p.year.to_string()))
    .collect();
  let y_labels = vec![
    Span::raw(format!("{:.2}", y[0])),
    Span::raw(format!("{:.2}", (y[0] + y[1]) / 2.0)),
    Span::raw(format!("{:.2}", y[1])),
  ];

  let inner = block.inner(area);
  f.render_widget(block, area);

  let parts = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(0)])
    .split(inner);

  f.render_widget(Paragraph::new(Line::from(headline)), parts[0]);

  let chart = Chart::new(vec![dataset])
    .x_axis(
      Axis::default()
        .style(Style::default().fg(Color::DarkGray))
        .bounds(x)
        .labels(x_labels),
    )
    .y_axis(
      Axis::default()
        .title("millions")
        .style(Style::default().fg(Color::DarkGray))
        .bounds(y)
        .labels(y_labels),
    );
  f.render_widget(chart, parts[1]);
}

// ─── Summary box ─────────────────────────────────────────────────────────────

fn draw_summary(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Overview ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let text = app
    .summary
    .display()
    .map(str::to_owned)
    .unwrap_or_else(|| "Press s for an overview of this metric.".to_string());
  let style = if app.summary.display().is_some() {
    Style::default()
  } else {
    Style::default().fg(Color::DarkGray)
  };

  f.render_widget(
    Paragraph::new(text)
      .style(style)
      .wrap(Wrap { trim: true })
      .block(block),
    area,
  );
}
