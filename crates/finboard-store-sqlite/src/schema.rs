//! SQL schema for the finboard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS company_metadata (
    ticker                 TEXT PRIMARY KEY,
    company_name           TEXT NOT NULL,
    investor_relations_url TEXT,
    created_at             TEXT NOT NULL    -- RFC 3339 UTC
);

-- No foreign key to company_metadata: facts may be loaded before their
-- metadata row, and are invisible to readers until it exists.
CREATE TABLE IF NOT EXISTS company_facts (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    company_name   TEXT    NOT NULL,
    ticker         TEXT    NOT NULL,
    year           INTEGER NOT NULL,
    statement_type TEXT    NOT NULL,
    metric         TEXT    NOT NULL,
    value          REAL,             -- NULL = not reported
    updated_at     TEXT    NOT NULL,
    UNIQUE (company_name, ticker, year, statement_type, metric)
);

CREATE INDEX IF NOT EXISTS company_facts_ticker_idx ON company_facts(ticker, year);

PRAGMA user_version = 1;
";

/// Insert a fact, replacing the value on a natural-key collision. The row id
/// is kept so insertion order survives re-imports.
pub const UPSERT_FACT: &str = "
INSERT INTO company_facts (
    company_name, ticker, year, statement_type, metric, value, updated_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT (company_name, ticker, year, statement_type, metric)
DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";

pub const UPSERT_METADATA: &str = "
INSERT INTO company_metadata (ticker, company_name, investor_relations_url, created_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (ticker)
DO UPDATE SET company_name = excluded.company_name,
              investor_relations_url = excluded.investor_relations_url
";
