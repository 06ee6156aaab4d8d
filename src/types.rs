use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Absolute URLs returned by one search, in engine order.
pub type SearchResult = Vec<String>;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct InjectRequest {
    /// The original prompt provided by the user.
    pub user_prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// SearXNG API types
#[derive(Debug, Deserialize)]
pub struct SearxngResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub number_of_results: f64,
    pub results: Vec<SearxngResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearxngResult {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}
