use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jira::JiraError;

/// Result alias for MCP server operations.
pub type MCPResult<T> = Result<T, MCPError>;

/// Errors raised while serving the protocol.
#[derive(Debug, thiserror::Error)]
pub enum MCPError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stdio channel failures. Loss of the channel ends the serving loop.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stdio channel closed")]
    Closed,
}

/// JSON-RPC level failures.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid JSON-RPC message: {0}")]
    InvalidMessage(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

/// Failures inside the tool layer. These are reported back to the caller as
/// an `isError` envelope, never as a protocol crash.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Jira(#[from] JiraError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON-RPC error codes used by the server.
#[derive(Debug, Clone, Copy)]
pub enum JsonRpcErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

/// JSON-RPC error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: JsonRpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
        }
    }
}

impl From<MCPError> for JsonRpcError {
    fn from(error: MCPError) -> Self {
        match &error {
            MCPError::Protocol(ProtocolError::MethodNotFound(_)) => {
                JsonRpcError::new(JsonRpcErrorCode::MethodNotFound, error.to_string())
            }
            MCPError::Protocol(ProtocolError::InvalidParams(_)) => {
                JsonRpcError::new(JsonRpcErrorCode::InvalidParams, error.to_string())
            }
            MCPError::Protocol(ProtocolError::ParseError(_)) => {
                JsonRpcError::new(JsonRpcErrorCode::ParseError, error.to_string())
            }
            MCPError::Protocol(ProtocolError::InvalidMessage(_)) => {
                JsonRpcError::new(JsonRpcErrorCode::InvalidRequest, error.to_string())
            }
            _ => JsonRpcError::new(JsonRpcErrorCode::InternalError, error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_found_maps_to_json_rpc_code() {
        let error = MCPError::Protocol(ProtocolError::MethodNotFound("bogus".to_string()));
        let rpc: JsonRpcError = error.into();
        assert_eq!(rpc.code, -32601);
        assert!(rpc.message.contains("bogus"));
    }

    #[test]
    fn test_tool_error_maps_to_internal() {
        let error = MCPError::Tool(ToolError::Internal("boom".to_string()));
        let rpc: JsonRpcError = error.into();
        assert_eq!(rpc.code, -32603);
    }
}
