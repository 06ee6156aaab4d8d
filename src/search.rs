use crate::cache::SearchCache;
use crate::config::{Config, SearchBackend};
use crate::duckduckgo::DuckDuckGoSearch;
use crate::error::SearchError;
use crate::types::*;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// A raw web search: query in, absolute URLs out.
#[async_trait]
pub trait RawSearch: Send + Sync {
    async fn raw_search(&self, query: &str) -> Result<SearchResult, SearchError>;
}

/// Cached, failure-contained access to a [`RawSearch`] backend.
///
/// `search` never fails: timeouts and backend errors are logged and turn into an
/// empty result, which is cached like any other.
pub struct SearchGateway {
    backend: Arc<dyn RawSearch>,
    cache: SearchCache,
    timeout: Duration,
    outbound_limit: Arc<Semaphore>,
}

impl SearchGateway {
    pub fn new(
        backend: Arc<dyn RawSearch>,
        cache: SearchCache,
        timeout: Duration,
        outbound_limit: Arc<Semaphore>,
    ) -> Self {
        Self {
            backend,
            cache,
            timeout,
            outbound_limit,
        }
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    pub async fn search(&self, query: &str) -> SearchResult {
        self.cache
            .lookup(query, |q| async move { self.fetch(&q).await })
            .await
    }

    async fn fetch(&self, query: &str) -> SearchResult {
        match self.try_fetch(query).await {
            Ok(urls) => {
                info!("Search for '{}' returned {} urls", query, urls.len());
                urls
            }
            Err(e) => {
                warn!("Web search failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch(&self, query: &str) -> Result<SearchResult, SearchError> {
        let _permit = self
            .outbound_limit
            .acquire()
            .await
            .map_err(|_| SearchError::Unavailable("outbound limiter closed".to_string()))?;

        tokio::time::timeout(self.timeout, self.backend.raw_search(query))
            .await
            .map_err(|_| SearchError::Timeout(self.timeout))?
    }
}

/// SearXNG JSON API backend.
pub struct SearxngSearch {
    client: reqwest::Client,
    base_url: String,
    engines: String,
}

impl SearxngSearch {
    pub fn new(client: reqwest::Client, base_url: String, engines: String) -> Self {
        Self {
            client,
            base_url,
            engines,
        }
    }
}

#[async_trait]
impl RawSearch for SearxngSearch {
    async fn raw_search(&self, query: &str) -> Result<SearchResult, SearchError> {
        info!("Searching SearXNG for: {}", query);

        let mut params: HashMap<&str, &str> = HashMap::new();
        params.insert("q", query);
        params.insert("format", "json");
        params.insert("engines", &self.engines);
        params.insert("categories", "general");
        params.insert("language", "en");
        params.insert("safesearch", "0");
        params.insert("pageno", "1");

        let search_url = format!("{}/search", self.base_url.trim_end_matches('/'));
        debug!("Search URL: {}", search_url);

        let resp = self
            .client
            .get(&search_url)
            .query(&params)
            .header("User-Agent", "MCP-Server/1.0")
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }

        let parsed: SearxngResponse = resp
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        debug!("SearXNG returned {} results", parsed.results.len());

        Ok(urls_from_response(parsed))
    }
}

fn urls_from_response(response: SearxngResponse) -> SearchResult {
    let mut seen = HashSet::new();
    response
        .results
        .into_iter()
        .map(|r| r.url)
        .filter(|url| url.starts_with("http") && seen.insert(url.clone()))
        .collect()
}

/// Build the configured search backend.
pub fn build_backend(config: &Config) -> Result<Arc<dyn RawSearch>> {
    let http_client = reqwest::Client::builder()
        .timeout(config.search_timeout)
        .build()?;

    let backend: Arc<dyn RawSearch> = match config.search_backend {
        SearchBackend::DuckDuckGo => Arc::new(DuckDuckGoSearch::new(http_client)),
        SearchBackend::Searxng => {
            if config.searxng_url.is_empty() {
                warn!("SEARXNG_URL is empty; searches will fail");
            }
            Arc::new(SearxngSearch::new(
                http_client,
                config.searxng_url.clone(),
                config.searxng_engines.clone(),
            ))
        }
    };
    Ok(backend)
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns the same URLs for every query and counts calls.
    pub struct FixedSearch {
        pub urls: SearchResult,
        pub calls: AtomicUsize,
    }

    impl FixedSearch {
        pub fn new(urls: &[&str]) -> Self {
            Self {
                urls: urls.iter().map(|u| u.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RawSearch for FixedSearch {
        async fn raw_search(&self, _query: &str) -> Result<SearchResult, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.urls.clone())
        }
    }

    /// Fails for queries in `failing`, otherwise returns one URL built from the query.
    pub struct PerQuerySearch {
        pub failing: Vec<String>,
        pub delay: Duration,
    }

    #[async_trait]
    impl RawSearch for PerQuerySearch {
        async fn raw_search(&self, query: &str) -> Result<SearchResult, SearchError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.failing.iter().any(|q| q == query) {
                return Err(SearchError::Status(503));
            }
            Ok(vec![format!("https://github.com/topics/{}", query)])
        }
    }

    pub fn gateway(backend: Arc<dyn RawSearch>, timeout: Duration) -> SearchGateway {
        SearchGateway::new(
            backend,
            SearchCache::new(Duration::from_secs(600), 1_000),
            timeout,
            Arc::new(Semaphore::new(32)),
        )
    }
}
