//! Time-bounded cache for company metadata.
//!
//! Metadata changes rarely, so the header is served from here until the entry
//! expires or the user reloads (`r`), which invalidates the current ticker.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use finboard_core::company::CompanyMetadata;

pub const DEFAULT_TTL_SECS: u64 = 10 * 60;

struct Entry {
  metadata:   CompanyMetadata,
  fetched_at: DateTime<Utc>,
}

pub struct MetaCache {
  ttl:     TimeDelta,
  entries: HashMap<String, Entry>,
}

impl MetaCache {
  pub fn new(ttl_secs: u64) -> Self {
    let ttl = i64::try_from(ttl_secs)
      .ok()
      .and_then(TimeDelta::try_seconds)
      .unwrap_or(TimeDelta::MAX);
    Self { ttl, entries: HashMap::new() }
  }

  /// The cached metadata for `ticker`, if it is younger than the TTL at `now`.
  pub fn get(&self, ticker: &str, now: DateTime<Utc>) -> Option<&CompanyMetadata> {
    self
      .entries
      .get(ticker)
      .filter(|e| now.signed_duration_since(e.fetched_at) < self.ttl)
      .map(|e| &e.metadata)
  }

  pub fn insert(&mut self, metadata: CompanyMetadata, now: DateTime<Utc>) {
    self.entries.insert(metadata.ticker.clone(), Entry {
      metadata,
      fetched_at: now,
    });
  }

  pub fn invalidate(&mut self, ticker: &str) -> bool { self.entries.remove(ticker).is_some() }
}

impl Default for MetaCache {
  fn default() -> Self { Self::new(DEFAULT_TTL_SECS) }
}
