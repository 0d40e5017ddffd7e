use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::mcp::errors::{JsonRpcError, MCPError, MCPResult, ProtocolError};

/// JSON-RPC 2.0 message as exchanged over the stdio channel.
///
/// A single struct covers requests, responses and notifications; the
/// optional fields determine which kind a given message is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MCPMessage {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// Typed view of a request message.
#[derive(Debug, Clone)]
pub struct MCPRequest {
    pub id: Value,
    pub method: String,
    pub params: Option<Value>,
}

impl MCPMessage {
    const JSONRPC_VERSION: &'static str = "2.0";

    pub fn request(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: Self::JSONRPC_VERSION.to_string(),
            id: Some(Value::String(Uuid::new_v4().to_string())),
            method: Some(method.into()),
            params,
            result: None,
            error: None,
        }
    }

    pub fn response(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: Self::JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: None,
            params: None,
            result: Some(result),
            error: None,
        }
    }

    pub fn error_response(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: Self::JSONRPC_VERSION.to_string(),
            id: Some(id),
            method: None,
            params: None,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_request(&self) -> bool {
        self.method.is_some() && self.id.is_some()
    }

    pub fn is_notification(&self) -> bool {
        self.method.is_some() && self.id.is_none()
    }

    pub fn is_response(&self) -> bool {
        self.method.is_none()
            && self.id.is_some()
            && (self.result.is_some() || self.error.is_some())
    }

    /// Structural validation: version string and field consistency.
    pub fn validate(&self) -> MCPResult<()> {
        if self.jsonrpc != Self::JSONRPC_VERSION {
            return Err(MCPError::Protocol(ProtocolError::InvalidMessage(format!(
                "unsupported JSON-RPC version: {}",
                self.jsonrpc
            ))));
        }

        if self.method.is_some() && (self.result.is_some() || self.error.is_some()) {
            return Err(MCPError::Protocol(ProtocolError::InvalidMessage(
                "request cannot carry result or error fields".to_string(),
            )));
        }

        if !self.is_request() && !self.is_notification() && !self.is_response() {
            return Err(MCPError::Protocol(ProtocolError::InvalidMessage(
                "message is neither a request, a response nor a notification".to_string(),
            )));
        }

        Ok(())
    }

    pub fn as_request(&self) -> MCPResult<MCPRequest> {
        if !self.is_request() {
            return Err(MCPError::Protocol(ProtocolError::InvalidMessage(
                "message is not a request".to_string(),
            )));
        }

        Ok(MCPRequest {
            // is_request() guarantees both fields.
            id: self.id.clone().unwrap_or(Value::Null),
            method: self.method.clone().unwrap_or_default(),
            params: self.params.clone(),
        })
    }

    /// Parse one newline-delimited JSON line into a validated message.
    pub fn parse(line: &str) -> MCPResult<MCPMessage> {
        let message: MCPMessage = serde_json::from_str(line)
            .map_err(|e| MCPError::Protocol(ProtocolError::ParseError(e.to_string())))?;
        message.validate()?;
        Ok(message)
    }

    pub fn serialize(&self) -> MCPResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Name/version pair identifying either endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub name: String,
    pub version: String,
}

/// Result of the `initialize` request.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: PeerInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    pub tools: ToolsCapability,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolsCapability {
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}
