use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::jira::client::VisibilityRestriction;
use crate::jira::JiraClient;
use crate::mcp::errors::ToolError;
use crate::mcp::tools::{MCPTool, ToolResult};

const DEFAULT_COMMENT_PAGE: u32 = 50;

/// List comments on an issue with their bodies flattened to plain text.
pub struct GetCommentsTool {
    client: Arc<JiraClient>,
}

impl GetCommentsTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MCPTool for GetCommentsTool {
    fn name(&self) -> &str {
        "jira_get_comments"
    }

    fn description(&self) -> &str {
        "List comments on a Jira issue. Comment bodies are flattened from \
         Atlassian Document Format to plain text."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_key": {
                    "type": "string",
                    "description": "Issue key, e.g. 'PROJ-123'"
                },
                "max_results": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "default": 50,
                    "description": "Maximum comments to return"
                }
            },
            "required": ["issue_key"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let issue_key = args["issue_key"].as_str().unwrap_or_default();
        let max_results = args["max_results"]
            .as_u64()
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_COMMENT_PAGE);

        debug!("Fetching comments for {}", issue_key);
        let comments = self.client.get_comments(issue_key, max_results).await?;
        ToolResult::json(&json!({ "comments": comments }))
    }
}

/// Add a comment to an issue, optionally restricted to a group or role.
pub struct AddCommentTool {
    client: Arc<JiraClient>,
}

impl AddCommentTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MCPTool for AddCommentTool {
    fn name(&self) -> &str {
        "jira_add_comment"
    }

    fn description(&self) -> &str {
        "Add a comment to a Jira issue. The plain-text body is wrapped in a \
         single-paragraph Atlassian document. Supply visibility_type and \
         visibility_value together to restrict the comment to a group or a \
         project role."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_key": {
                    "type": "string",
                    "description": "Issue key, e.g. 'PROJ-123'"
                },
                "body": {
                    "type": "string",
                    "description": "Plain-text comment body"
                },
                "visibility_type": {
                    "type": "string",
                    "enum": ["group", "role"],
                    "description": "Restrict visibility to a group or a project role"
                },
                "visibility_value": {
                    "type": "string",
                    "description": "Group name or role name the restriction applies to"
                }
            },
            "required": ["issue_key", "body"],
            "dependencies": {
                "visibility_type": ["visibility_value"],
                "visibility_value": ["visibility_type"]
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let issue_key = args["issue_key"].as_str().unwrap_or_default();
        let body = args["body"].as_str().unwrap_or_default();

        let visibility = match (
            args["visibility_type"].as_str(),
            args["visibility_value"].as_str(),
        ) {
            (Some(visibility_type), Some(value)) => Some(VisibilityRestriction {
                visibility_type: visibility_type.to_string(),
                value: value.to_string(),
            }),
            _ => None,
        };

        debug!("Adding comment to {}", issue_key);
        let comment = self
            .client
            .add_comment(issue_key, body, visibility.as_ref())
            .await?;
        ToolResult::json(&comment)
    }
}
