//! `--import` mode: load a [`CompanyImport`] document into the store.

use std::path::Path;

use finboard_core::{import::CompanyImport, store::FactStore};

use crate::{Error, Result};

/// Outcome of one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
  pub ticker:        String,
  pub facts_written: usize,
}

/// Read `path`, upsert its metadata row and every fact.
///
/// The document is written as a whole or not at all. Re-importing the same document replaces values in place; it never creates
/// duplicate rows.
pub async fn run_import<S: FactStore>(store: &S, path: &Path) -> Result<ImportReport> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .map_err(|source| Error::ReadImport { path: path.to_path_buf(), source })?;

  let (metadata, facts) = CompanyImport::from_json(&raw)?.into_parts();
  let ticker = metadata.ticker.clone();
  let unreported = facts.iter().filter(|f| f.value.is_none()).count();

  let facts_written = store
    .import_company(metadata, facts)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  tracing::info!(%ticker, facts_written, unreported, "import complete");
  Ok(ImportReport { ticker, facts_written })
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use finboard_store_sqlite::SqliteStore;

  use super::*;

  const DOC: &str = r#"{
    "ticker": "ADYEN",
    "company_name": "Adyen N.V.",
    "investor_relations_url": "https://www.adyen.com/investor-relations",
    "facts": [
      { "year": 2023, "statement_type": "Income Statement", "metric": "Revenue", "value": "€ 1,626.0" },
      { "year": 2024, "statement_type": "Income Statement", "metric": "Revenue", "value": 1996.0 },
      { "year": 2024, "statement_type": "Income Statement", "metric": "EPS", "value": null },
      { "year": 2024, "statement_type": "Balance Sheet", "metric": "Cash", "value": "n/a" }
    ]
  }"#;

  fn write_doc(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("finboard-import-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[tokio::test]
  async fn import_writes_metadata_and_facts() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let path = write_doc("adyen.json", DOC);

    let report = run_import(&store, &path).await.unwrap();
    assert_eq!(report, ImportReport { ticker: "ADYEN".into(), facts_written: 4 });

    let meta = store.get_metadata("ADYEN").await.unwrap().unwrap();
    assert_eq!(meta.company_name, "Adyen N.V.");

    let facts = store.get_facts("ADYEN").await.unwrap().unwrap();
    assert_eq!(facts.len(), 4);
    assert_eq!(facts[0].value, Some(1626.0));
    assert!(facts.iter().filter(|f| f.value.is_none()).count() == 2);
  }

  #[tokio::test]
  async fn reimport_is_idempotent() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let path = write_doc("adyen-twice.json", DOC);

    run_import(&store, &path).await.unwrap();
    run_import(&store, &path).await.unwrap();

    assert_eq!(store.get_facts("ADYEN").await.unwrap().unwrap().len(), 4);
    assert_eq!(store.list_companies().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn rejected_import_leaves_no_company() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let path = write_doc(
      "blank-metric.json",
      r#"{
        "ticker": "BAD",
        "company_name": "Bad Data plc",
        "investor_relations_url": "https://example.com/ir",
        "facts": [
          { "year": 2024, "statement_type": "Income Statement", "metric": "Revenue", "value": 1.0 },
          { "year": 2024, "statement_type": "Income Statement", "metric": " ", "value": 2.0 }
        ]
      }"#,
    );

    let err = run_import(&store, &path).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(store.get_metadata("BAD").await.unwrap(), None);
    assert_eq!(store.get_facts("BAD").await.unwrap(), None);
    assert!(store.list_companies().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn missing_file_is_read_error() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let err = run_import(&store, Path::new("/definitely/not/here.json"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::ReadImport { .. }));
  }

  #[tokio::test]
  async fn malformed_document_is_parse_error() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let path = write_doc("broken.json", "{ \"ticker\": ");
    let err = run_import(&store, &path).await.unwrap_err();
    assert!(matches!(err, Error::ParseImport(_)));
  }
}
