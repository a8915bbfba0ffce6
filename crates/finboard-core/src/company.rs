//! Company metadata — one row per ticker.

use serde::{Deserialize, Serialize};

/// Descriptive data about a listed company.
///
/// A ticker without a metadata row is treated as unknown, even if facts exist
/// for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMetadata {
  pub ticker:                 String,
  pub company_name:           String,
  pub investor_relations_url: Option<String>,
}
