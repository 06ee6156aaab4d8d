use crate::types::*;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub const TOOL_NAME: &str = "inject_urls_into_prompt";
pub const TOOL_DESCRIPTION: &str = "Injects relevant URLs into the user's prompt based on its content.";

#[derive(Debug, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpToolsResponse {
    pub tools: Vec<McpTool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpCallResponse {
    pub content: Vec<McpContent>,
    pub is_error: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// JSON schema of the tool input, derived from [`InjectRequest`].
pub fn input_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(InjectRequest)).unwrap_or_else(|_| {
        serde_json::json!({
            "type": "object",
            "properties": { "user_prompt": { "type": "string" } },
            "required": ["user_prompt"]
        })
    })
}

pub async fn list_tools() -> Json<McpToolsResponse> {
    Json(McpToolsResponse {
        tools: vec![McpTool {
            name: TOOL_NAME.to_string(),
            description: TOOL_DESCRIPTION.to_string(),
            input_schema: input_schema(),
        }],
    })
}

/// Direct tool endpoint: JSON prompt in, plain-text augmented prompt out.
pub async fn inject_urls(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InjectRequest>, JsonRejection>,
) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = body.map_err(rejected_body)?;
    info!("{} called with prompt: {}", TOOL_NAME, request.user_prompt);
    Ok(state.pipeline.augment(&request.user_prompt).await)
}

pub async fn call_tool(
    State(state): State<Arc<AppState>>,
    body: Result<Json<McpCallRequest>, JsonRejection>,
) -> Result<Json<McpCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = body.map_err(rejected_body)?;
    info!("MCP tool call: {} with args: {:?}", request.name, request.arguments);

    if request.name != TOOL_NAME {
        return Err(bad_request(format!("Unknown tool: {}", request.name)));
    }

    let prompt = request
        .arguments
        .get("user_prompt")
        .and_then(|v| v.as_str())
        .ok_or_else(|| bad_request("Missing required parameter: user_prompt".to_string()))?;

    let text = state.pipeline.augment(prompt).await;
    Ok(Json(McpCallResponse {
        content: vec![McpContent {
            content_type: "text".to_string(),
            text,
        }],
        is_error: false,
    }))
}

fn bad_request(error: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// Malformed or mistyped JSON bodies are a client error like any other bad argument.
fn rejected_body(rejection: JsonRejection) -> (StatusCode, Json<ErrorResponse>) {
    bad_request(rejection.body_text())
}
