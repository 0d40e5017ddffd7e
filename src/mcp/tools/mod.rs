/// Tool definitions and the response envelope shared by every tool.
///
/// A tool is pure glue: a name, a description, a JSON-schema parameter
/// contract, and an async handler that maps validated arguments to one (or,
/// for mutating operations, two) Jira API calls and projects the result.
pub mod jira;
pub mod registry;

pub use self::registry::ToolRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mcp::errors::ToolError;

/// Core trait implemented by every tool the server exposes.
#[async_trait]
pub trait MCPTool: Send + Sync {
    /// Unique tool name as declared to the client.
    fn name(&self) -> &str;

    /// Human-readable description for tool discovery.
    fn description(&self) -> &str;

    /// JSON-schema parameter contract. The registry validates arguments
    /// against this schema before `execute` runs, so handlers may assume
    /// required fields are present and correctly typed.
    fn input_schema(&self) -> Value;

    /// Run the tool. Jira errors propagate unchanged; the registry converts
    /// them into an error envelope.
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError>;
}

/// Response envelope returned to the caller for every tool call:
/// `{ "content": [{ "type": "text", "text": <JSON string> }] }`, with an
/// `isError` flag set on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

/// Content blocks a tool can return. This server only ever emits text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Success envelope wrapping a JSON-serializable payload.
    pub fn json<T: Serialize>(payload: &T) -> Result<ToolResult, ToolError> {
        let text = serde_json::to_string_pretty(payload)
            .map_err(|e| ToolError::Internal(format!("failed to serialize response: {}", e)))?;

        Ok(ToolResult {
            content: vec![Content::Text { text }],
            is_error: false,
        })
    }

    /// Error envelope with a structured `{"error": ...}` payload.
    pub fn error(message: impl Into<String>) -> ToolResult {
        let payload = serde_json::json!({ "error": message.into() });
        ToolResult {
            content: vec![Content::Text {
                text: payload.to_string(),
            }],
            is_error: true,
        }
    }
}

/// Tool description sent in response to `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let result = ToolResult::json(&json!({"key": "PROJ-1"})).unwrap();
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["content"][0]["type"], "text");
        assert!(value.get("isError").is_none());

        let text = value["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["key"], "PROJ-1");
    }

    #[test]
    fn test_error_envelope_shape() {
        let result = ToolResult::error("something broke");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["isError"], true);
        let text = value["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert_eq!(payload["error"], "something broke");
    }
}
