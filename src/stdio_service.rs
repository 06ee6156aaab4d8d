use rmcp::{model::*, ServiceExt};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::mcp::{input_schema, TOOL_DESCRIPTION, TOOL_NAME};
use crate::search::build_backend;
use crate::AppState;

/// MCP stdio front end. The transport is local to the parent process, so the bearer
/// gate and rate limiter of the HTTP server are not involved.
#[derive(Clone)]
pub struct McpService {
    pub state: Arc<AppState>,
}

impl McpService {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config::from_env()?;
        info!("Starting MCP stdio service ({:?} backend)", config.search_backend);
        let backend = build_backend(&config)?;
        Ok(Self::new(Arc::new(AppState::new(&config, backend))))
    }
}

fn tool_definition() -> Tool {
    Tool {
        name: Cow::Borrowed(TOOL_NAME),
        description: Some(Cow::Borrowed(TOOL_DESCRIPTION)),
        input_schema: match input_schema() {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        },
        output_schema: None,
        annotations: None,
    }
}

impl rmcp::ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "url-injector".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "Appends a short list of relevant, allowlisted web resources to a prompt.".to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _page: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: vec![tool_definition()],
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("MCP tool call: {} with args: {:?}", request.name, request.arguments);

        if request.name != TOOL_NAME {
            return Err(ErrorData::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", request.name),
                None,
            ));
        }

        let args = request.arguments.as_ref().ok_or_else(|| {
            ErrorData::new(ErrorCode::INVALID_PARAMS, "Missing required arguments object", None)
        })?;
        let prompt = args
            .get("user_prompt")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ErrorData::new(ErrorCode::INVALID_PARAMS, "Missing required parameter: user_prompt", None)
            })?;

        let augmented = self.state.pipeline.augment(prompt).await;
        Ok(CallToolResult::success(vec![Content::text(augmented)]))
    }
}

pub async fn run() -> anyhow::Result<()> {
    // stdout carries the protocol, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let service = McpService::from_env()?;
    let server = service.serve(rmcp::transport::stdio()).await?;
    info!("MCP stdio server running");
    let _quit_reason = server.waiting().await?;
    Ok(())
}
