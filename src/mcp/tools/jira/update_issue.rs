use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::jira::types::adf_document;
use crate::jira::JiraClient;
use crate::mcp::errors::ToolError;
use crate::mcp::tools::jira::{assignee_field, string_list, AssigneeKind};
use crate::mcp::tools::{MCPTool, ToolResult};

/// Update issue fields and return the re-fetched issue.
pub struct UpdateIssueTool {
    client: Arc<JiraClient>,
}

impl UpdateIssueTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

/// Build the `fields` object for the update call. Only fields the caller
/// actually supplied are included.
pub(crate) fn build_update_fields(args: &Value) -> Value {
    let mut fields = json!({});

    if let Some(summary) = args["summary"].as_str() {
        fields["summary"] = json!(summary);
    }
    if let Some(description) = args["description"].as_str() {
        fields["description"] = adf_document(description);
    }
    if let Some(priority) = args["priority"].as_str() {
        fields["priority"] = json!({ "name": priority });
    }
    if let Some(assignee) = args["assignee"].as_str() {
        let kind = AssigneeKind::from_arg(args["assignee_kind"].as_str());
        fields["assignee"] = assignee_field(assignee, kind);
    }
    if let Some(labels) = string_list(args, "labels") {
        fields["labels"] = json!(labels);
    }

    fields
}

#[async_trait]
impl MCPTool for UpdateIssueTool {
    fn name(&self) -> &str {
        "jira_update_issue"
    }

    fn description(&self) -> &str {
        "Update fields on a Jira issue. The response is the issue re-fetched after \
         the update; a concurrent external mutation between the two calls may be \
         reflected in it."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_key": {
                    "type": "string",
                    "description": "Issue key, e.g. 'PROJ-123'"
                },
                "summary": { "type": "string" },
                "description": {
                    "type": "string",
                    "description": "Plain-text description replacing the current one"
                },
                "priority": {
                    "type": "string",
                    "description": "Priority name, e.g. 'High'"
                },
                "assignee": {
                    "type": "string",
                    "description": "Assignee account id or legacy username"
                },
                "assignee_kind": {
                    "type": "string",
                    "enum": ["account_id", "username"],
                    "description": "How to interpret 'assignee'"
                },
                "labels": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Replaces the full label list"
                }
            },
            "required": ["issue_key"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let issue_key = args["issue_key"].as_str().unwrap_or_default();
        let fields = build_update_fields(&args);

        if fields.as_object().map(|o| o.is_empty()).unwrap_or(true) {
            return Err(ToolError::InvalidArguments(
                "no updatable fields supplied".to_string(),
            ));
        }

        debug!("Updating issue {}", issue_key);
        let issue = self.client.update_issue(issue_key, fields).await?;
        ToolResult::json(&issue)
    }
}
