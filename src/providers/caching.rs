use crate::core::cache::KeyValueCollection;
use crate::core::rates::{CurrencyRateProvider, RateCacheEntry, RateSnapshot};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const RATES_KEY: &[u8] = b"currency_rates";
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(60 * 60);

/// Serves persisted rates while they are fresh and falls back to the last
/// known rates when a refresh fails.
pub struct RateCache {
    inner: Box<dyn CurrencyRateProvider>,
    collection: Arc<dyn KeyValueCollection>,
    freshness: Duration,
}

impl RateCache {
    pub fn new(
        inner: impl CurrencyRateProvider + 'static,
        collection: Arc<dyn KeyValueCollection>,
        freshness: Duration,
    ) -> Self {
        Self {
            inner: Box::new(inner),
            collection,
            freshness,
        }
    }

    /// Reads the persisted entry. An entry that does not parse is removed.
    pub async fn cached(&self) -> Option<RateCacheEntry> {
        let bytes = self.collection.get(RATES_KEY).await?;
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Discarding unreadable rate cache entry: {}", e);
                if let Err(e) = self.collection.remove(RATES_KEY).await {
                    debug!("Failed to remove rate cache entry: {}", e);
                }
                None
            }
        }
    }

    pub async fn get_rates(&self) -> Result<RateSnapshot> {
        let now = Utc::now().timestamp_millis();
        let cached = self.cached().await;

        if let Some(entry) = &cached
            && entry.is_fresh(now, self.freshness)
        {
            debug!("Rate cache HIT, fetched at {}", entry.fetched_at_ms);
            return Ok(entry.snapshot(false));
        }
        debug!("Rate cache MISS or expired");

        match self.inner.fetch_rates().await {
            Ok(rates) => {
                let entry = RateCacheEntry {
                    rates,
                    fetched_at_ms: now,
                };
                match serde_json::to_vec(&entry) {
                    Ok(bytes) => {
                        if let Err(e) = self.collection.put(RATES_KEY, &bytes).await {
                            warn!("Failed to persist currency rates: {}", e);
                        }
                    }
                    Err(e) => warn!("Failed to encode currency rates: {}", e),
                }
                Ok(entry.snapshot(false))
            }
            Err(e) => match cached {
                Some(entry) => {
                    warn!("Rate refresh failed, serving stale rates: {:#}", e);
                    Ok(entry.snapshot(true))
                }
                None => Err(e),
            },
        }
    }
}
