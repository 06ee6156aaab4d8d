pub mod auth;
pub mod cache;
pub mod config;
pub mod duckduckgo;
pub mod error;
pub mod filter;
pub mod keywords;
pub mod mcp;
pub mod middleware;
pub mod pipeline;
pub mod ratelimit;
pub mod search;
pub mod stdio_service;
pub mod types;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthGate;
use crate::cache::SearchCache;
use crate::config::Config;
use crate::filter::AllowlistFilter;
use crate::pipeline::AugmentationPipeline;
use crate::ratelimit::RateLimiter;
use crate::search::{RawSearch, SearchGateway};

pub use types::*;

/// Process-wide components, built once at startup and shared by every request.
pub struct AppState {
    pub auth: AuthGate,
    pub limiter: RateLimiter,
    pub pipeline: AugmentationPipeline,
}

impl AppState {
    pub fn new(config: &Config, backend: Arc<dyn RawSearch>) -> Self {
        let cache = SearchCache::new(config.cache_ttl, config.cache_max_entries);
        let gateway = SearchGateway::new(
            backend,
            cache,
            config.search_timeout,
            Arc::new(tokio::sync::Semaphore::new(config.outbound_concurrency)),
        );
        let filter = AllowlistFilter::new(config.allowed_domains.clone(), config.max_urls);

        Self {
            auth: AuthGate::new(config.api_key.clone()),
            limiter: RateLimiter::new(config.rate_limit, config.rate_window),
            pipeline: AugmentationPipeline::new(gateway, filter, config.search_fan_out),
        }
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// HTTP surface. Authentication runs before rate limiting; both wrap every route.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/mcp/tools", get(mcp::list_tools))
        .route("/mcp/call", post(mcp::call_tool))
        .route("/mcp/tool/inject_urls_into_prompt", post(mcp::inject_urls))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn_with_state(state.clone(), middleware::authenticate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
