use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_KEY: &str = "change-me-please";
pub const DEFAULT_MAX_URLS: usize = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_RATE_LIMIT: u32 = 60;
pub const DEFAULT_RATE_WINDOW_SECS: u64 = 60;
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "docs.python.org",
    "realpython.com",
    "stackoverflow.com",
    "w3schools.com",
    "geeksforgeeks.org",
    "tutorialspoint.com",
    "pythonbasics.org",
    "pypi.org",
    "github.com",
    "medium.com",
    "dev.to",
    "towardsdatascience.com",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBackend {
    DuckDuckGo,
    Searxng,
}

impl FromStr for SearchBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "duckduckgo" | "ddg" => Ok(SearchBackend::DuckDuckGo),
            "searxng" => Ok(SearchBackend::Searxng),
            other => Err(anyhow!("unknown search backend '{}'", other)),
        }
    }
}

/// Runtime settings for the server and the augmentation pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub rate_limit: u32,
    pub rate_window: Duration,
    pub cache_ttl: Duration,
    pub cache_max_entries: u64,
    pub allowed_domains: Vec<String>,
    pub max_urls: usize,
    pub search_timeout: Duration,
    pub search_fan_out: usize,
    pub outbound_concurrency: usize,
    pub search_backend: SearchBackend,
    pub searxng_url: String,
    pub searxng_engines: String,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_window: Duration::from_secs(DEFAULT_RATE_WINDOW_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_max_entries: 10_000,
            allowed_domains: DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            max_urls: DEFAULT_MAX_URLS,
            search_timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
            search_fan_out: 4,
            outbound_concurrency: 32,
            search_backend: SearchBackend::DuckDuckGo,
            searxng_url: "http://localhost:8888".to_string(),
            searxng_engines: "duckduckgo,google,bing".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Config {
    /// Build the configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Config::default();

        let api_key = env::var("MCP_API_KEY").unwrap_or(defaults.api_key);
        if api_key == DEFAULT_API_KEY {
            warn!("MCP_API_KEY is not set, using the built-in default token");
        }

        let allowed_domains = match env::var("ALLOWED_DOMAINS") {
            Ok(raw) => parse_domain_list(&raw),
            Err(_) => defaults.allowed_domains,
        };

        Ok(Self {
            api_key,
            rate_limit: env_or("MCP_RATE_LIMIT", defaults.rate_limit)?,
            rate_window: Duration::from_secs(env_or("MCP_RATE_WINDOW_SECS", DEFAULT_RATE_WINDOW_SECS)?),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries)?,
            allowed_domains,
            max_urls: env_or("MAX_URLS", defaults.max_urls)?,
            search_timeout: Duration::from_secs(env_or("SEARCH_TIMEOUT_SECS", DEFAULT_SEARCH_TIMEOUT_SECS)?),
            search_fan_out: env_or("SEARCH_FAN_OUT", defaults.search_fan_out)?.max(1),
            outbound_concurrency: env_or("OUTBOUND_CONCURRENCY", defaults.outbound_concurrency)?.max(1),
            search_backend: env_or("SEARCH_BACKEND", defaults.search_backend)?,
            searxng_url: env::var("SEARXNG_URL").unwrap_or(defaults.searxng_url),
            searxng_engines: env::var("SEARXNG_ENGINES").unwrap_or(defaults.searxng_engines),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("invalid value for {}: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_limits() {
        let config = Config::default();
        assert_eq!(config.max_urls, 10);
        assert_eq!(config.rate_limit, 60);
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.allowed_domains.len(), DEFAULT_ALLOWED_DOMAINS.len());
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_parse_domain_list_skips_blanks() {
        let domains = parse_domain_list(" github.com, ,dev.to,");
        assert_eq!(domains, vec!["github.com".to_string(), "dev.to".to_string()]);
    }

    #[test]
    fn test_search_backend_from_str() {
        assert_eq!("DuckDuckGo".parse::<SearchBackend>().unwrap(), SearchBackend::DuckDuckGo);
        assert_eq!("searxng".parse::<SearchBackend>().unwrap(), SearchBackend::Searxng);
        assert!("bing".parse::<SearchBackend>().is_err());
    }
}
