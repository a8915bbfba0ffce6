//! Statement table view.

use finboard_core::pivot::PivotTable;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::app::App;

const LABEL_WIDTH: u16 = 36;
const CELL_WIDTH: u16 = 10;

/// Flatten sections into display rows: a bold header per section followed by
/// its metric rows.
fn body_rows(table: &PivotTable) -> Vec<Row<'_>> {
  let mut rows = Vec::with_capacity(table.sections.len() + table.row_count());
  for section in &table.sections {
    rows.push(
      Row::new(vec![Cell::from(section.section_label.as_str())]).style(
        Style::default()
          .fg(Color::Cyan)
          .add_modifier(Modifier::BOLD),
      ),
    );
    for row in &section.rows {
      let mut cells = Vec::with_capacity(row.cells.len() + 1);
      cells.push(Cell::from(format!("  {}", row.row_label)));
      cells.extend(row.cells.iter().map(|c| {
        let style = if c.starts_with('-') && c.len() > 1 {
          Style::default().fg(Color::Red)
        } else {
          Style::default()
        };
        Cell::from(format!("{c:>w$}", w = CELL_WIDTH as usize)).style(style)
      }));
      rows.push(Row::new(cells));
    }
  }
  rows
}

/// Render the pivoted table of the current ticker into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Statements (millions) ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if app.table.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No data available.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let header = Row::new(
    std::iter::once(Cell::from("Metric")).chain(
      app
        .table
        .columns
        .iter()
        .map(|y| Cell::from(format!("{y:>w$}", w = CELL_WIDTH as usize))),
    ),
  )
  .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));

  let widths: Vec<Constraint> = std::iter::once(Constraint::Min(LABEL_WIDTH))
    .chain(app.table.columns.iter().map(|_| Constraint::Length(CELL_WIDTH)))
    .collect();

  let rows: Vec<Row> = body_rows(&app.table)
    .into_iter()
    .skip(app.table_scroll)
    .collect();

  f.render_widget(Table::new(rows, widths).header(header).block(block), area);
}
