//! The `FactStore` trait.
//!
//! Implemented by storage backends (e.g. `finboard-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{company::CompanyMetadata, fact::Fact};

/// Abstraction over a finboard fact store backend.
///
/// Reads treat the metadata table as the source of truth for which tickers
/// exist: a ticker without a metadata row is unknown, whatever facts may be
/// stored for it.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait FactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// All known companies, ordered by ticker.
  fn list_companies(
    &self,
  ) -> impl Future<Output = Result<Vec<CompanyMetadata>, Self::Error>> + Send + '_;

  /// Metadata for `ticker`. Returns `None` if the ticker is unknown.
  fn get_metadata<'a>(
    &'a self,
    ticker: &'a str,
  ) -> impl Future<Output = Result<Option<CompanyMetadata>, Self::Error>> + Send + 'a;

  /// All facts for `ticker`, ordered by year ascending and then by insertion
  /// order. Returns `None` if the ticker is unknown.
  fn get_facts<'a>(
    &'a self,
    ticker: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<Fact>>, Self::Error>> + Send + 'a;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert or replace the metadata row for `metadata.ticker`.
  fn upsert_metadata(
    &self,
    metadata: CompanyMetadata,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert facts, replacing the value of any fact with the same natural key.
  /// All facts are written in one transaction. Returns the number written.
  fn upsert_facts(
    &self,
    facts: Vec<Fact>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Write a company's metadata row and its facts as one unit: if any record
  /// is rejected, nothing is written. Returns the number of facts written.
  fn import_company(
    &self,
    metadata: CompanyMetadata,
    facts: Vec<Fact>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
