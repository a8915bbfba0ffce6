//! Pivot engine — reshapes a flat fact list into a sectioned, year-columned
//! display table.
//!
//! The transform is pure: no I/O and no error channel. Missing or non-numeric
//! values degrade to the `"-"` placeholder.
//!
//! Steps, in order:
//!
//! 1. Drop facts whose statement type is [`HISTORICAL`].
//! 2. Derive the column list from the distinct years ([`ColumnOrder`]).
//! 3. Group into sections by statement type and rows by metric, both in
//!    first-seen order. A repeated `(statement type, metric, year)` overwrites
//!    the earlier value.
//! 4. Format each cell as the value in millions with two decimals.
//! 5. Drop rows with no meaningful cell, then sections with no rows.

use std::{
  cmp::Ordering,
  collections::{BTreeSet, HashMap},
};

use serde::{Deserialize, Serialize};

use crate::fact::{FactRecord, HISTORICAL};

/// The year shown first when present; the most recent complete fiscal year.
pub const DEFAULT_PINNED_YEAR: i32 = 2024;

/// Placeholder for a missing or non-numeric value.
pub const EMPTY_CELL: &str = "-";

// ─── Output types ────────────────────────────────────────────────────────────

/// A display-ready table. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
  /// Years rendered as strings, in display order.
  pub columns:  Vec<String>,
  pub sections: Vec<Section>,
}

/// All rows of one statement type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
  pub section_label: String,
  pub rows:          Vec<Row>,
}

/// One metric across all columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
  pub row_label: String,
  pub cells:     Vec<String>,
}

impl PivotTable {
  pub fn is_empty(&self) -> bool { self.sections.is_empty() }

  /// Total number of metric rows across all sections.
  pub fn row_count(&self) -> usize {
    self.sections.iter().map(|s| s.rows.len()).sum()
  }
}

// ─── Column policy ───────────────────────────────────────────────────────────

/// How the year columns are ordered.
///
/// The pinned year, if present in the data, always comes first. All other
/// years follow newest to oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOrder {
  pub pinned_year: Option<i32>,
}

impl Default for ColumnOrder {
  fn default() -> Self {
    Self { pinned_year: Some(DEFAULT_PINNED_YEAR) }
  }
}

impl ColumnOrder {
  /// Plain descending order.
  pub fn descending() -> Self { Self { pinned_year: None } }

  /// Build a policy from a configured year, where `0` disables pinning.
  pub fn from_config(pinned_year: i32) -> Self {
    Self { pinned_year: (pinned_year != 0).then_some(pinned_year) }
  }

  fn compare(&self, a: i32, b: i32) -> Ordering {
    match self.pinned_year {
      Some(p) if a == p && b != p => Ordering::Less,
      Some(p) if b == p && a != p => Ordering::Greater,
      _ => b.cmp(&a),
    }
  }

  /// Deduplicate and order `years`.
  pub fn columns(&self, years: impl IntoIterator<Item = i32>) -> Vec<i32> {
    let mut years: Vec<i32> = years.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    years.sort_by(|a, b| self.compare(*a, *b));
    years
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

struct MetricGroup<'a> {
  metric: &'a str,
  values: HashMap<i32, Option<f64>>,
}

struct SectionGroup<'a> {
  statement_type: &'a str,
  metrics:        Vec<MetricGroup<'a>>,
  index:          HashMap<&'a str, usize>,
}

/// Pivot with the default column policy (2024 pinned first).
pub fn pivot(facts: &[FactRecord]) -> PivotTable {
  pivot_with(facts, ColumnOrder::default())
}

/// Pivot `facts` using `order` for the year columns.
pub fn pivot_with(facts: &[FactRecord], order: ColumnOrder) -> PivotTable {
  let visible: Vec<&FactRecord> = facts
    .iter()
    .filter(|f| f.statement_type != HISTORICAL)
    .collect();

  let years = order.columns(visible.iter().map(|f| f.year));

  let mut sections: Vec<SectionGroup<'_>> = Vec::new();
  let mut section_index: HashMap<&str, usize> = HashMap::new();

  for &fact in &visible {
    let si = *section_index
      .entry(fact.statement_type.as_str())
      .or_insert_with(|| {
        sections.push(SectionGroup {
          statement_type: fact.statement_type.as_str(),
          metrics:        Vec::new(),
          index:          HashMap::new(),
        });
        sections.len() - 1
      });

    let SectionGroup { metrics, index, .. } = &mut sections[si];
    let mi = *index.entry(fact.metric.as_str()).or_insert_with(|| {
      metrics.push(MetricGroup {
        metric: fact.metric.as_str(),
        values: HashMap::new(),
      });
      metrics.len() - 1
    });

    // Last write wins.
    metrics[mi].values.insert(fact.year, fact.value);
  }

  let sections = sections
    .into_iter()
    .filter_map(|group| {
      let rows: Vec<Row> = group
        .metrics
        .into_iter()
        .map(|m| Row {
          row_label: m.metric.to_owned(),
          cells:     years
            .iter()
            .map(|y| format_cell(m.values.get(y).copied().flatten()))
            .collect(),
        })
        .filter(|row| !is_empty_row(row))
        .collect();

      (!rows.is_empty()).then(|| Section {
        section_label: group.statement_type.to_owned(),
        rows,
      })
    })
    .collect();

  PivotTable {
    columns: years.iter().map(i32::to_string).collect(),
    sections,
  }
}

/// Format a raw currency amount as millions with exactly two decimals.
pub fn format_cell(value: Option<f64>) -> String {
  match value.filter(|v| v.is_finite()) {
    Some(v) => format_millions(v),
    None => EMPTY_CELL.to_owned(),
  }
}

fn format_millions(value: f64) -> String {
  let mut millions = value / 1_000_000.0;
  if millions == 0.0 {
    // Normalise -0.0.
    millions = 0.0;
  }
  // `{:.2}` rounds exact halves to even. The only exact halves at two decimals
  // are odd multiples of 1/8; those round away from zero instead.
  let eighths = millions * 8.0;
  if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
    return format!("{:.2}", (millions * 100.0).round() / 100.0);
  }
  format!("{millions:.2}")
}

fn is_empty_cell(cell: &str) -> bool {
  matches!(cell, EMPTY_CELL | "" | "0" | "0.00")
}

fn is_empty_row(row: &Row) -> bool { row.cells.iter().all(|c| is_empty_cell(c)) }

// ─── Tests ───────────────────────────────────────────────────────────────────
