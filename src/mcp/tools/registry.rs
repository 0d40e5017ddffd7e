use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::mcp::errors::{MCPError, MCPResult, ToolError};
use crate::mcp::tools::{MCPTool, ToolInfo, ToolResult};

/// Flat name-keyed dispatch table.
///
/// Every tool is registered once at startup together with its compiled
/// parameter schema. Dispatch is a single lookup; no dynamic discovery, no
/// statistics, no state between calls. All failures — unknown name, schema
/// violation, handler error — come back as an `isError` envelope so the
/// protocol layer never sees a tool-level failure as a crash.
pub struct ToolRegistry {
    tools: HashMap<String, ToolEntry>,
}

struct ToolEntry {
    tool: Box<dyn MCPTool>,
    schema: JSONSchema,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, compiling its parameter schema. Duplicate names and
    /// invalid schemas are rejected at startup rather than at call time.
    pub fn register(&mut self, tool: Box<dyn MCPTool>) -> MCPResult<()> {
        let name = tool.name().to_string();

        if self.tools.contains_key(&name) {
            return Err(MCPError::Tool(ToolError::Internal(format!(
                "tool '{}' is already registered",
                name
            ))));
        }

        let schema_value = tool.input_schema();
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_value)
            .map_err(|e| {
                MCPError::Tool(ToolError::Internal(format!(
                    "invalid schema for tool '{}': {}",
                    name, e
                )))
            })?;

        info!("Registered tool: {}", name);
        self.tools.insert(name, ToolEntry { tool, schema });
        Ok(())
    }

    /// List all tools for `tools/list`.
    pub fn list(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|entry| ToolInfo {
                name: entry.tool.name().to_string(),
                description: entry.tool.description().to_string(),
                input_schema: entry.tool.input_schema(),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Dispatch one call: look up the handler, validate arguments against the
    /// declared schema, run it, and fold every failure into an envelope.
    pub async fn call(&self, name: &str, args: Value) -> ToolResult {
        let Some(entry) = self.tools.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return ToolResult::error(ToolError::UnknownTool(name.to_string()).to_string());
        };

        let args = if args.is_null() { json!({}) } else { args };

        if let Err(errors) = entry.schema.validate(&args) {
            let details: Vec<String> = errors.map(|e| e.to_string()).collect();
            debug!("Schema validation failed for {}: {:?}", name, details);
            return ToolResult::error(format!(
                "invalid arguments for {}: {}",
                name,
                details.join("; ")
            ));
        }

        match entry.tool.execute(args).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                ToolResult::error(e.to_string())
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Tool that must never run; proves schema validation happens first.
    struct RejectingTool;

    #[async_trait]
    impl MCPTool for RejectingTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo a message"
        }

        fn input_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" }
                },
                "required": ["message"],
                "additionalProperties": false
            })
        }

        async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
            let message = args["message"].as_str().unwrap_or_default();
            ToolResult::json(&json!({ "echo": message }))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(RejectingTool)).unwrap();
        registry
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = registry();
        assert!(registry.register(Box::new(RejectingTool)).is_err());
    }

    #[test]
    fn test_list_is_sorted_and_carries_schema() {
        let registry = registry();
        let tools = registry.list();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "echo");
        assert_eq!(tools[0].input_schema["required"][0], "message");
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_error_envelope() {
        let result = registry().call("does_not_exist", json!({})).await;
        assert!(result.is_error);

        let crate::mcp::tools::Content::Text { text } = &result.content[0];
        assert!(text.contains("unknown tool: does_not_exist"), "got: {}", text);
    }

    #[tokio::test]
    async fn test_missing_required_field_rejected_before_execute() {
        let result = registry().call("echo", json!({})).await;
        assert!(result.is_error);

        let crate::mcp::tools::Content::Text { text } = &result.content[0];
        assert!(text.contains("message"), "got: {}", text);
    }

    #[tokio::test]
    async fn test_wrong_type_rejected() {
        let result = registry().call("echo", json!({ "message": 42 })).await;
        assert!(result.is_error);
    }

    #[tokio::test]
    async fn test_valid_call_succeeds() {
        let result = registry().call("echo", json!({ "message": "hi" })).await;
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn test_null_args_treated_as_empty_object() {
        // A tool with no required fields accepts a null arguments member.
        struct NoArgsTool;

        #[async_trait]
        impl MCPTool for NoArgsTool {
            fn name(&self) -> &str {
                "noop"
            }
            fn description(&self) -> &str {
                "Do nothing"
            }
            fn input_schema(&self) -> Value {
                json!({ "type": "object", "properties": {} })
            }
            async fn execute(&self, _args: Value) -> Result<ToolResult, ToolError> {
                ToolResult::json(&json!({ "ok": true }))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NoArgsTool)).unwrap();
        let result = registry.call("noop", Value::Null).await;
        assert!(!result.is_error);
    }
}
