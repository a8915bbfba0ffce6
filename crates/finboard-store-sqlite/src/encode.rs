//! Encoding, decoding and validation between domain types and SQLite rows.
//!
//! Timestamps are stored as RFC 3339 strings. Amounts are stored as `REAL`;
//! non-finite values are stored as NULL.

use chrono::{DateTime, Utc};
use finboard_core::{company::CompanyMetadata, fact::Fact};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_value(value: Option<f64>) -> Option<f64> {
  value.filter(|v| v.is_finite())
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn require(field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidRecord(format!("{field} must not be empty")));
  }
  Ok(())
}

pub fn validate_fact(fact: &Fact) -> Result<()> {
  require("company_name", &fact.company_name)?;
  require("ticker", &fact.ticker)?;
  require("statement_type", &fact.statement_type)?;
  require("metric", &fact.metric)?;
  Ok(())
}

pub fn validate_metadata(meta: &CompanyMetadata) -> Result<()> {
  require("ticker", &meta.ticker)?;
  require("company_name", &meta.company_name)?;
  Ok(())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns read directly from a `company_facts` row.
pub struct RawFact {
  pub company_name:   String,
  pub ticker:         String,
  pub year:           i32,
  pub statement_type: String,
  pub metric:         String,
  pub value:          Option<f64>,
}

impl RawFact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      company_name:   row.get(0)?,
      ticker:         row.get(1)?,
      year:           row.get(2)?,
      statement_type: row.get(3)?,
      metric:         row.get(4)?,
      value:          row.get(5)?,
    })
  }

  pub fn into_fact(self) -> Fact {
    Fact {
      company_name:   self.company_name,
      ticker:         self.ticker,
      year:           self.year,
      statement_type: self.statement_type,
      metric:         self.metric,
      value:          encode_value(self.value),
    }
  }
}

/// Columns read directly from a `company_metadata` row.
pub struct RawMetadata {
  pub ticker:                 String,
  pub company_name:           String,
  pub investor_relations_url: Option<String>,
}

impl RawMetadata {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      ticker:                 row.get(0)?,
      company_name:           row.get(1)?,
      investor_relations_url: row.get(2)?,
    })
  }

  pub fn into_metadata(self) -> CompanyMetadata {
    CompanyMetadata {
      ticker:                 self.ticker,
      company_name:           self.company_name,
      // Older producers wrote "" for an unknown URL.
      investor_relations_url: self.investor_relations_url.filter(|u| !u.is_empty()),
    }
  }
}
