use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::types::SearchResult;

/// A cached result set. Expiry is enforced by the cache's time-to-live;
/// `created_at` is only reported in hit logs.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub created_at: DateTime<Utc>,
    pub urls: SearchResult,
}

/// Query → URL list cache with a fixed time-to-live.
///
/// Concurrent lookups of a query that is not cached yet share a single fetch: the first
/// caller runs it and the others wait on the pending slot for the same key.
#[derive(Clone)]
pub struct SearchCache {
    entries: Cache<String, CacheEntry>,
}

impl SearchCache {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn lookup<F, Fut>(&self, query: &str, fetch: F) -> SearchResult
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = SearchResult>,
    {
        // Drops expired entries before serving
        self.entries.run_pending_tasks().await;

        let owned = query.to_string();
        let entry = self
            .entries
            .entry_by_ref(query)
            .or_insert_with(async move {
                let urls = fetch(owned).await;
                CacheEntry {
                    created_at: Utc::now(),
                    urls,
                }
            })
            .await;

        if entry.is_fresh() {
            debug!("search cache filled for '{}' ({} urls)", query, entry.value().urls.len());
        } else {
            let age = Utc::now() - entry.value().created_at;
            debug!("search cache hit for '{}' (age {}s)", query, age.num_seconds());
        }

        entry.into_value().urls
    }

    /// Number of live entries after pending expirations are applied.
    pub async fn len(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }

    pub async fn invalidate_all(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}
