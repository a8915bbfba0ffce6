//! Bulk import document for pre-structured company data.
//!
//! Produced by an external extraction process; the server's `--import` mode
//! loads it into the store.

use serde::{Deserialize, Serialize};

use crate::{
  Result,
  company::CompanyMetadata,
  fact::{Fact, FactValue},
};

/// One company's metadata plus its facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyImport {
  pub ticker:                 String,
  pub company_name:           String,
  #[serde(default)]
  pub investor_relations_url: Option<String>,
  #[serde(default)]
  pub facts:                  Vec<ImportedFact>,
}

/// A fact whose value has not been cleaned yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportedFact {
  pub year:           i32,
  pub statement_type: String,
  pub metric:         String,
  #[serde(default)]
  pub value:          FactValue,
}

impl CompanyImport {
  pub fn from_json(raw: &str) -> Result<Self> { Ok(serde_json::from_str(raw)?) }

  /// Split into the metadata row and typed facts ready for the store.
  pub fn into_parts(self) -> (CompanyMetadata, Vec<Fact>) {
    let metadata = CompanyMetadata {
      ticker:                 self.ticker.clone(),
      company_name:           self.company_name.clone(),
      investor_relations_url: self.investor_relations_url,
    };
    let facts = self
      .facts
      .into_iter()
      .map(|f| Fact {
        company_name:   self.company_name.clone(),
        ticker:         self.ticker.clone(),
        year:           f.year,
        statement_type: f.statement_type,
        metric:         f.metric,
        value:          f.value.to_amount(),
      })
      .collect();
    (metadata, facts)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parts_carry_company_into_every_fact() {
    let doc = CompanyImport::from_json(
      r#"{
        "ticker": "ADYEN",
        "company_name": "Adyen N.V.",
        "facts": [
          { "year": 2024, "statement_type": "Income Statement", "metric": "Revenue", "value": "€1,996.0" },
          { "year": 2023, "statement_type": "Income Statement", "metric": "Revenue" }
        ]
      }"#,
    )
    .unwrap();

    let (meta, facts) = doc.into_parts();
    assert_eq!(meta.ticker, "ADYEN");
    assert_eq!(meta.investor_relations_url, None);
    assert_eq!(facts.len(), 2);
    assert!(facts.iter().all(|f| f.company_name == "Adyen N.V." && f.ticker == "ADYEN"));
    assert_eq!(facts[0].value, Some(1996.0));
    assert_eq!(facts[1].value, None);
  }

  #[test]
  fn missing_required_field_is_an_error() {
    assert!(CompanyImport::from_json(r#"{ "ticker": "X" }"#).is_err());
  }
}
