use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::types::PriceLookupResult;

/// A cached lookup result. `updated_at` drives freshness; the result's own
/// `last_updated` is the provider fetch time surfaced to callers.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: PriceLookupResult,
    pub updated_at: DateTime<Utc>,
}

/// Narrow seam over the backing store so the orchestrator can be tested
/// without a real database. `get` returns only fresh entries; callers cannot
/// distinguish absent from stale, both are misses. `put` is an unconditional
/// last-write-wins upsert.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;
    async fn put(&self, key: &str, result: &PriceLookupResult) -> Result<()>;
}

/// In-process store. Stale rows are bypassed on read and overwritten on the
/// next successful fetch; there is no proactive sweep.
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            ttl: Duration::hours(ttl_hours),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.updated_at < self.ttl
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("cache lock poisoned"))?;
        let now = Utc::now();
        Ok(entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .cloned())
    }

    async fn put(&self, key: &str, result: &PriceLookupResult) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("cache lock poisoned"))?;
        entries.insert(
            key.to_string(),
            CacheEntry {
                result: result.clone(),
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }
}
