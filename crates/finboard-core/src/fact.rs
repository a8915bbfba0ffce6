//! Fact types — one reported financial line item per row.
//!
//! A fact is identified by its natural key `(company_name, ticker, year,
//! statement_type, metric)`. The value is optional: `None` means the figure was
//! not reported.

use serde::{Deserialize, Serialize};

/// Reserved statement type for raw, unaggregated data that is never displayed
/// in the pivoted table.
pub const HISTORICAL: &str = "Historical";

// ─── Fact ────────────────────────────────────────────────────────────────────

/// A stored financial data point for a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
  pub company_name:   String,
  pub ticker:         String,
  pub year:           i32,
  pub statement_type: String,
  pub metric:         String,
  pub value:          Option<f64>,
}

impl From<Fact> for FactRecord {
  fn from(f: Fact) -> Self {
    FactRecord {
      year:           f.year,
      statement_type: f.statement_type,
      metric:         f.metric,
      value:          f.value,
    }
  }
}

// ─── FactRecord ──────────────────────────────────────────────────────────────

/// A fact as returned by `GET /company/{ticker}`: no company name, since the
/// ticker is implied by the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
  pub year:           i32,
  pub statement_type: String,
  pub metric:         String,
  pub value:          Option<f64>,
}

impl FactRecord {
  pub fn is_historical(&self) -> bool { self.statement_type == HISTORICAL }

  /// The value if it is a usable number. NaN and infinities count as missing.
  pub fn amount(&self) -> Option<f64> { self.value.filter(|v| v.is_finite()) }
}

/// Response body of `GET /company/{ticker}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyFacts {
  /// Where the data came from; always `"db"` for the stored facts.
  pub source: String,
  pub data:   Vec<FactRecord>,
}

impl CompanyFacts {
  pub fn from_store(facts: Vec<Fact>) -> Self {
    Self {
      source: "db".to_owned(),
      data:   facts.into_iter().map(FactRecord::from).collect(),
    }
  }
}

// ─── Loosely-typed input values ──────────────────────────────────────────────

/// A value as it arrives from an external producer, before it is validated
/// into an `Option<f64>`.
///
/// Scraped figures frequently come through as strings such as `"$1,234.5"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
  Number(f64),
  Text(String),
  #[default]
  Missing,
}

impl FactValue {
  /// Convert to a stored amount. Anything that does not clean up to a finite
  /// number becomes `None`.
  pub fn to_amount(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n).filter(|v| v.is_finite()),
      Self::Text(s) => clean_amount(s),
      Self::Missing => None,
    }
  }
}

/// Strip thousands separators and currency symbols, then parse.
pub fn clean_amount(raw: &str) -> Option<f64> {
  let cleaned: String = raw
    .chars()
    .filter(|c| !matches!(c, ',' | '$' | '€'))
    .collect();
  cleaned
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
}
