//! Per-metric time series — the input to charts and to the summary service.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  Error,
  fact::{FactRecord, HISTORICAL},
};

// ─── MetricKey ───────────────────────────────────────────────────────────────

/// Identifies one line of a statement, e.g. `Income Statement: Net Income`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricKey {
  pub statement_type: String,
  pub metric:         String,
}

impl MetricKey {
  pub fn new(statement_type: impl Into<String>, metric: impl Into<String>) -> Self {
    Self {
      statement_type: statement_type.into(),
      metric:         metric.into(),
    }
  }

  /// `"{statement_type}: {metric}"`.
  pub fn label(&self) -> String { self.to_string() }

  fn matches(&self, fact: &FactRecord) -> bool {
    fact.statement_type == self.statement_type && fact.metric == self.metric
  }
}

impl fmt::Display for MetricKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.statement_type, self.metric)
  }
}

impl FromStr for MetricKey {
  type Err = Error;

  /// Splits on the first `:`; metric names may themselves contain colons.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (statement_type, metric) = s
      .split_once(':')
      .map(|(a, b)| (a.trim(), b.trim()))
      .filter(|(a, b)| !a.is_empty() && !b.is_empty())
      .ok_or_else(|| Error::InvalidMetricLabel(s.to_owned()))?;
    Ok(Self::new(statement_type, metric))
  }
}

/// Distinct displayable metrics in first-seen order. Historical facts are
/// excluded.
pub fn metric_keys(facts: &[FactRecord]) -> Vec<MetricKey> {
  let mut keys: Vec<MetricKey> = Vec::new();
  for fact in facts.iter().filter(|f| !f.is_historical()) {
    if !keys.iter().any(|k| k.matches(fact)) {
      keys.push(MetricKey::new(&fact.statement_type, &fact.metric));
    }
  }
  keys
}

// ─── TimeSeries ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub year:  i32,
  pub value: f64,
}

/// Numeric `(year, value)` points, strictly ascending by year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
  pub points: Vec<Point>,
}

impl TimeSeries {
  pub fn is_empty(&self) -> bool { self.points.is_empty() }

  pub fn len(&self) -> usize { self.points.len() }

  pub fn latest(&self) -> Option<Point> { self.points.last().copied() }

  pub fn previous(&self) -> Option<Point> {
    self.points.len().checked_sub(2).map(|i| self.points[i])
  }

  /// Percentage change from the previous point to the latest one.
  /// `None` with fewer than two points or a zero base.
  pub fn year_over_year(&self) -> Option<f64> {
    let (latest, previous) = (self.latest()?, self.previous()?);
    (previous.value != 0.0)
      .then(|| (latest.value - previous.value) / previous.value.abs() * 100.0)
  }
}

/// Extract the series for `key`.
///
/// Historical facts only contribute when `key` itself names the historical
/// statement type. Later facts for the same year overwrite earlier ones; years
/// whose final value is missing are skipped.
pub fn time_series(facts: &[FactRecord], key: &MetricKey) -> TimeSeries {
  let include_historical = key.statement_type == HISTORICAL;
  let mut by_year: BTreeMap<i32, Option<f64>> = BTreeMap::new();

  for fact in facts
    .iter()
    .filter(|f| include_historical || !f.is_historical())
    .filter(|f| key.matches(f))
  {
    by_year.insert(fact.year, fact.amount());
  }

  TimeSeries {
    points: by_year
      .into_iter()
      .filter_map(|(year, value)| value.map(|value| Point { year, value }))
      .collect(),
  }
}
