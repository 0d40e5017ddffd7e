use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::jira::JiraClient;
use crate::mcp::errors::ToolError;
use crate::mcp::tools::jira::string_list;
use crate::mcp::tools::{MCPTool, ToolResult};

/// Fetch a single issue by key.
pub struct GetIssueTool {
    client: Arc<JiraClient>,
}

impl GetIssueTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MCPTool for GetIssueTool {
    fn name(&self) -> &str {
        "jira_get_issue"
    }

    fn description(&self) -> &str {
        "Fetch one Jira issue by key and return its projected fields (summary, \
         status, type, project, priority, people, dates, labels, components, fix \
         versions)."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_key": {
                    "type": "string",
                    "description": "Issue key, e.g. 'PROJ-123'"
                },
                "fields": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Restrict the response to these fields"
                }
            },
            "required": ["issue_key"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let issue_key = args["issue_key"].as_str().unwrap_or_default();
        let fields = string_list(&args, "fields");

        debug!("Fetching issue {}", issue_key);
        let issue = self.client.get_issue(issue_key, fields.as_deref()).await?;
        ToolResult::json(&issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JiraConfig;

    #[test]
    fn test_schema_requires_issue_key() {
        let config = JiraConfig::new("https://example.atlassian.net", "user", "token");
        let tool = GetIssueTool::new(Arc::new(JiraClient::new(&config).unwrap()));

        assert_eq!(tool.name(), "jira_get_issue");
        assert_eq!(tool.input_schema()["required"], json!(["issue_key"]));
    }
}
