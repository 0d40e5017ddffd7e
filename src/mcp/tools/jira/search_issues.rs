use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::jira::{JiraClient, SearchRequest};
use crate::mcp::errors::ToolError;
use crate::mcp::tools::jira::string_list;
use crate::mcp::tools::{MCPTool, ToolResult};

/// Search issues with JQL, one page at a time.
pub struct SearchIssuesTool {
    client: Arc<JiraClient>,
}

impl SearchIssuesTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MCPTool for SearchIssuesTool {
    fn name(&self) -> &str {
        "jira_search"
    }

    fn description(&self) -> &str {
        "Search Jira issues with a JQL query. Returns one page of issues plus a \
         pagination signal (nextPageToken or isLast) when more pages may exist; \
         pass nextPageToken back to continue. Ordering comes from the JQL ORDER BY \
         clause."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "jql": {
                    "type": "string",
                    "description": "JQL query, e.g. 'project = PROJ AND status = \"In Progress\" ORDER BY created DESC'"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Page-size bound",
                    "default": 50,
                    "minimum": 1,
                    "maximum": 100
                },
                "next_page_token": {
                    "type": "string",
                    "description": "Continuation token from a previous page, passed back verbatim"
                },
                "fields": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Explicit field list; defaults to a minimal field set when omitted"
                }
            },
            "required": ["jql"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let request = SearchRequest {
            jql: args["jql"].as_str().unwrap_or_default().to_string(),
            max_results: args["max_results"].as_u64().map(|n| n as u32),
            next_page_token: args["next_page_token"]
                .as_str()
                .map(|s| s.to_string()),
            fields: string_list(&args, "fields"),
        };

        debug!("Searching issues: {}", request.jql);
        let page = self.client.search(&request).await?;
        ToolResult::json(&page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JiraConfig;

    fn tool() -> SearchIssuesTool {
        let config = JiraConfig::new("https://example.atlassian.net", "user", "token");
        SearchIssuesTool::new(Arc::new(JiraClient::new(&config).unwrap()))
    }

    #[test]
    fn test_schema_requires_jql() {
        let schema = tool().input_schema();
        assert_eq!(schema["required"], json!(["jql"]));
        assert_eq!(schema["properties"]["max_results"]["default"], 50);
    }

    #[test]
    fn test_name_and_description() {
        let tool = tool();
        assert_eq!(tool.name(), "jira_search");
        assert!(tool.description().contains("nextPageToken"));
    }
}
