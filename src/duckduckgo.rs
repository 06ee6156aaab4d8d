use crate::error::SearchError;
use crate::search::RawSearch;
use crate::types::SearchResult;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

pub const SEARCH_ENDPOINT: &str = "https://duckduckgo.com/html/";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; MCPBot/1.0; +https://modelcontextprotocol.io)";

/// Searches the DuckDuckGo HTML front end and collects result links.
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, SEARCH_ENDPOINT.to_string())
    }

    pub fn with_endpoint(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl RawSearch for DuckDuckGoSearch {
    async fn raw_search(&self, query: &str) -> Result<SearchResult, SearchError> {
        info!("Searching DuckDuckGo for: {}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .header("User-Agent", USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        let links = extract_result_links(&html);
        debug!("DuckDuckGo page for '{}' had {} links", query, links.len());
        Ok(links)
    }
}

/// Collect absolute link targets from a result page, in document order.
///
/// DuckDuckGo wraps results in `/l/?uddg=<target>` redirects; those are unwrapped.
pub fn extract_result_links(html: &str) -> SearchResult {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let target = if href.starts_with("http") {
            Some(href.to_string())
        } else {
            unwrap_redirect(href)
        };

        if let Some(url) = target {
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
    }

    links
}

fn unwrap_redirect(href: &str) -> Option<String> {
    let base = Url::parse(SEARCH_ENDPOINT).ok()?;
    let resolved = base.join(href).ok()?;
    if !resolved.path().starts_with("/l/") {
        return None;
    }
    resolved
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned())
        .filter(|target| target.starts_with("http"))
}
