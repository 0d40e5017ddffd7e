use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::jira::JiraClient;
use crate::mcp::errors::{MCPError, MCPResult, ProtocolError};
use crate::mcp::protocol::{
    InitializeResult, MCPMessage, MCPRequest, PeerInfo, ServerCapabilities, ToolsCapability,
};
use crate::mcp::tools::jira::{
    AddCommentTool, CreateIssueTool, GetCommentsTool, GetIssueTool, GetTransitionsTool,
    SearchIssuesTool, TransitionIssueTool, UpdateIssueTool,
};
use crate::mcp::tools::registry::ToolRegistry;
use crate::mcp::transport::StdioTransport;
use crate::mcp::{MCP_PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION};

/// The MCP server: one tool registry plus the request loop.
///
/// Requests are served sequentially in arrival order; the next message is
/// not read until the current response has been written.
pub struct MCPServer {
    registry: ToolRegistry,
}

impl MCPServer {
    /// Build the server and register every Jira tool against the shared
    /// client.
    pub fn new(client: Arc<JiraClient>) -> MCPResult<Self> {
        let mut registry = ToolRegistry::new();

        registry.register(Box::new(SearchIssuesTool::new(client.clone())))?;
        registry.register(Box::new(GetIssueTool::new(client.clone())))?;
        registry.register(Box::new(CreateIssueTool::new(client.clone())))?;
        registry.register(Box::new(UpdateIssueTool::new(client.clone())))?;
        registry.register(Box::new(GetTransitionsTool::new(client.clone())))?;
        registry.register(Box::new(TransitionIssueTool::new(client.clone())))?;
        registry.register(Box::new(GetCommentsTool::new(client.clone())))?;
        registry.register(Box::new(AddCommentTool::new(client)))?;

        Ok(Self { registry })
    }

    /// Serve requests until the peer closes stdin.
    pub async fn run(&self, mut transport: StdioTransport) -> MCPResult<()> {
        info!(
            "{} v{} serving {} tools over stdio",
            SERVER_NAME,
            SERVER_VERSION,
            self.registry.list().len()
        );

        while let Some(message) = transport.receive().await? {
            if message.is_notification() {
                debug!("Ignoring notification: {:?}", message.method);
                continue;
            }

            if !message.is_request() {
                warn!("Ignoring non-request message");
                continue;
            }

            let request = message.as_request()?;
            let response = self.handle_request(request).await;
            transport.send(&response).await?;
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Route one request to its handler. Protocol-level failures become
    /// JSON-RPC error responses; tool failures were already folded into the
    /// result envelope by the registry.
    pub async fn handle_request(&self, request: MCPRequest) -> MCPMessage {
        let id = request.id.clone();
        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(request.params).await,
            "ping" => Ok(json!({})),
            other => Err(MCPError::Protocol(ProtocolError::MethodNotFound(
                other.to_string(),
            ))),
        };

        match outcome {
            Ok(result) => MCPMessage::response(id, result),
            Err(error) => {
                warn!("Request failed: {}", error);
                MCPMessage::error_response(id, error.into())
            }
        }
    }

    fn handle_initialize(&self) -> MCPResult<Value> {
        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability::default(),
            },
            server_info: PeerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_tools_list(&self) -> MCPResult<Value> {
        Ok(json!({ "tools": self.registry.list() }))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> MCPResult<Value> {
        let params = params.ok_or_else(|| {
            MCPError::Protocol(ProtocolError::InvalidParams(
                "tools/call requires params".to_string(),
            ))
        })?;

        let name = params["name"].as_str().ok_or_else(|| {
            MCPError::Protocol(ProtocolError::InvalidParams(
                "missing tool name".to_string(),
            ))
        })?;
        let args = params.get("arguments").cloned().unwrap_or(Value::Null);

        debug!("Calling tool {}", name);
        let result = self.registry.call(name, args).await;
        Ok(serde_json::to_value(result)?)
    }
}
