use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::jira::types::adf_document;
use crate::jira::JiraClient;
use crate::mcp::errors::ToolError;
use crate::mcp::tools::jira::{assignee_field, string_list, AssigneeKind};
use crate::mcp::tools::{MCPTool, ToolResult};

/// Create an issue and return the full created entity.
pub struct CreateIssueTool {
    client: Arc<JiraClient>,
}

impl CreateIssueTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

/// Build the `fields` object for the create call from validated arguments.
pub(crate) fn build_create_fields(args: &Value) -> Value {
    let mut fields = json!({
        "project": { "key": args["project_key"].as_str().unwrap_or_default() },
        "summary": args["summary"].as_str().unwrap_or_default(),
        "issuetype": { "name": args["issue_type"].as_str().unwrap_or_default() },
    });

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
    if let Some(components) = string_list(args, "components") {
        let named: Vec<Value> = components
            .iter()
            .map(|name| json!({ "name": name }))
            .collect();
        fields["components"] = json!(named);
    }

    fields
}

#[async_trait]
impl MCPTool for CreateIssueTool {
    fn name(&self) -> &str {
        "jira_create_issue"
    }

    fn description(&self) -> &str {
        "Create a Jira issue and return the created entity. Issues a create call \
         followed by a fetch of the new key; the two calls are not atomic."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_key": {
                    "type": "string",
                    "description": "Key of the project to create the issue in"
                },
                "summary": {
                    "type": "string",
                    "description": "Issue summary line"
                },
                "issue_type": {
                    "type": "string",
                    "description": "Issue type name, e.g. 'Task', 'Bug', 'Story'"
                },
                "description": {
                    "type": "string",
                    "description": "Plain-text description"
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
                    "description": "How to interpret 'assignee'; when omitted a string containing '@' or longer than 20 characters is assumed to be an account id"
                },
                "labels": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "components": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Component names"
                }
            },
            "required": ["project_key", "summary", "issue_type"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let fields = build_create_fields(&args);

        debug!(
            "Creating issue in project {}",
            args["project_key"].as_str().unwrap_or_default()
        );
        let issue = self.client.create_issue(fields).await?;
        ToolResult::json(&issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_create_fields() {
        let fields = build_create_fields(&json!({
            "project_key": "PROJ",
            "summary": "New issue",
            "issue_type": "Task"
        }));

        assert_eq!(fields["project"]["key"], "PROJ");
        assert_eq!(fields["summary"], "New issue");
        assert_eq!(fields["issuetype"]["name"], "Task");
        assert!(fields.get("description").is_none());
        assert!(fields.get("assignee").is_none());
    }

    #[test]
    fn test_full_create_fields() {
        let fields = build_create_fields(&json!({
            "project_key": "PROJ",
            "summary": "New issue",
            "issue_type": "Bug",
            "description": "It broke.",
            "priority": "High",
            "assignee": "ada@example.com",
            "labels": ["auth"],
            "components": ["backend", "api"]
        }));

        assert_eq!(fields["description"]["type"], "doc");
        assert_eq!(fields["priority"]["name"], "High");
        assert_eq!(fields["assignee"]["accountId"], "ada@example.com");
        assert_eq!(fields["labels"], json!(["auth"]));
        assert_eq!(
            fields["components"],
            json!([{ "name": "backend" }, { "name": "api" }])
        );
    }

    #[test]
    fn test_assignee_kind_respected() {
        let fields = build_create_fields(&json!({
            "project_key": "PROJ",
            "summary": "s",
            "issue_type": "Task",
            "assignee": "averylongusernameindeed",
            "assignee_kind": "username"
        }));

        assert_eq!(fields["assignee"]["name"], "averylongusernameindeed");
        assert!(fields["assignee"].get("accountId").is_none());
    }
}
