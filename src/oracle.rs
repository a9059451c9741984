use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::error::LookupError;
use crate::grading;
use crate::sources::SourceRegistry;
use crate::types::{CardQuery, PriceLookupResult};

/// Public entry point: read-through cache in front of the per-game source
/// adapters, with grading applied per request. Stateless per call; the only
/// shared state is the cache store.
pub struct PriceOracle {
    registry: SourceRegistry,
    cache: Arc<dyn CacheStore>,
}

impl PriceOracle {
    pub fn new(registry: SourceRegistry, cache: Arc<dyn CacheStore>) -> Self {
        Self { registry, cache }
    }

    pub async fn lookup(&self, query: &CardQuery) -> Result<PriceLookupResult, LookupError> {
        if query.card_name.trim().is_empty() {
            return Err(LookupError::validation("cardName must not be empty"));
        }

        let key = query.cache_key();

        match self.cache.get(&key).await {
            Ok(Some(entry)) => {
                debug!(key = %key, "cache hit");
                let mut result = entry.result;
                // Grading depends on per-request input; recompute it fresh
                // rather than trusting anything cached.
                result.graded_price = match (&query.grading, &result.raw_price) {
                    (Some(grading), Some(raw)) => grading::graded_price(raw.avg, grading),
                    _ => None,
                };
                result.message = Some("Cached result".to_string());
                return Ok(result);
            }
            Ok(None) => debug!(key = %key, "cache miss"),
            // A broken cache degrades to a miss; the lookup itself must
            // still succeed.
            Err(e) => warn!(key = %key, "cache read failed: {e:#}"),
        }

        let source = self.registry.get(query.game).ok_or_else(|| {
            LookupError::Internal(anyhow::anyhow!(
                "no price source registered for game '{}'",
                query.game.as_str()
            ))
        })?;

        let mut result = source.fetch(query).await.map_err(|e| LookupError::Upstream {
            provider: source.name().to_string(),
            message: format!("{e:#}"),
        })?;

        match &result.raw_price {
            Some(raw) => {
                info!(
                    card = %result.card_name,
                    source = %result.source,
                    avg = raw.avg,
                    "fetched price"
                );
                // Cache the result before attaching the per-request grading
                // estimate; failures and soft misses are never cached.
                if let Err(e) = self.cache.put(&key, &result).await {
                    warn!(key = %key, "cache write failed: {e:#}");
                }
                if let Some(grading) = &query.grading {
                    result.graded_price = grading::graded_price(raw.avg, grading);
                }
            }
            None => {
                info!(
                    card = %query.card_name,
                    source = %result.source,
                    message = result.message.as_deref().unwrap_or(""),
                    "no price available"
                );
            }
        }

        Ok(result)
    }
}
