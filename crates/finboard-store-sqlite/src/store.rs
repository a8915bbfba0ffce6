//! [`SqliteStore`] — the SQLite implementation of [`FactStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use finboard_core::{company::CompanyMetadata, fact::Fact, store::FactStore};

use crate::{
  Result,
  encode::{
    RawFact, RawMetadata, encode_dt, encode_value, validate_fact, validate_metadata,
  },
  schema::{SCHEMA, UPSERT_FACT, UPSERT_METADATA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A finboard fact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn query_metadata(
  conn: &rusqlite::Connection,
  ticker: &str,
) -> rusqlite::Result<Option<RawMetadata>> {
  conn
    .query_row(
      "SELECT ticker, company_name, investor_relations_url
       FROM company_metadata WHERE ticker = ?1",
      rusqlite::params![ticker],
      RawMetadata::from_row,
    )
    .optional()
}

fn write_metadata(
  conn: &rusqlite::Connection,
  metadata: &CompanyMetadata,
  created_at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    UPSERT_METADATA,
    rusqlite::params![
      metadata.ticker,
      metadata.company_name,
      metadata.investor_relations_url,
      created_at,
    ],
  )?;
  Ok(())
}

fn write_facts(
  conn: &rusqlite::Connection,
  facts: &[Fact],
  updated_at: &str,
) -> rusqlite::Result<usize> {
  let mut stmt = conn.prepare(UPSERT_FACT)?;
  let mut written = 0;
  for fact in facts {
    written += stmt.execute(rusqlite::params![
      fact.company_name,
      fact.ticker,
      fact.year,
      fact.statement_type,
      fact.metric,
      encode_value(fact.value),
      updated_at,
    ])?;
  }
  Ok(written)
}

// ─── FactStore impl ──────────────────────────────────────────────────────────

impl FactStore for SqliteStore {
  type Error = crate::Error;

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_companies(&self) -> Result<Vec<CompanyMetadata>> {
    let raws: Vec<RawMetadata> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT ticker, company_name, investor_relations_url
           FROM company_metadata ORDER BY ticker",
        )?;
        let rows = stmt
          .query_map([], RawMetadata::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(RawMetadata::into_metadata).collect())
  }

  async fn get_metadata(&self, ticker: &str) -> Result<Option<CompanyMetadata>> {
    let ticker = ticker.to_owned();

    let raw = self
      .conn
      .call(move |conn| Ok(query_metadata(conn, &ticker)?))
      .await?;

    Ok(raw.map(RawMetadata::into_metadata))
  }

  async fn get_facts(&self, ticker: &str) -> Result<Option<Vec<Fact>>> {
    let ticker = ticker.to_owned();

    let raws: Option<Vec<RawFact>> = self
      .conn
      .call(move |conn| {
        if query_metadata(conn, &ticker)?.is_none() {
          return Ok(None);
        }

        let mut stmt = conn.prepare(
          "SELECT company_name, ticker, year, statement_type, metric, value
           FROM company_facts
           WHERE ticker = ?1
           ORDER BY year ASC, id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![ticker], RawFact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    Ok(raws.map(|rows| rows.into_iter().map(RawFact::into_fact).collect()))
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert_metadata(&self, metadata: CompanyMetadata) -> Result<()> {
    validate_metadata(&metadata)?;
    let ticker = metadata.ticker.clone();
    let created_at = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| Ok(write_metadata(conn, &metadata, &created_at)?))
      .await?;

    tracing::debug!(%ticker, "upserted company metadata");
    Ok(())
  }

  async fn upsert_facts(&self, facts: Vec<Fact>) -> Result<usize> {
    for fact in &facts {
      validate_fact(fact)?;
    }
    let updated_at = encode_dt(Utc::now());

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let written = write_facts(&tx, &facts, &updated_at)?;
        tx.commit()?;
        Ok(written)
      })
      .await?;

    tracing::debug!(written, "upserted facts");
    Ok(written)
  }

  async fn import_company(&self, metadata: CompanyMetadata, facts: Vec<Fact>) -> Result<usize> {
    validate_metadata(&metadata)?;
    for fact in &facts {
      validate_fact(fact)?;
    }
    let ticker = metadata.ticker.clone();
    let now = encode_dt(Utc::now());

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_metadata(&tx, &metadata, &now)?;
        let written = write_facts(&tx, &facts, &now)?;
        tx.commit()?;
        Ok(written)
      })
      .await?;

    tracing::debug!(%ticker, written, "imported company");
    Ok(written)
  }
}
