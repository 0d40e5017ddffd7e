use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::jira::JiraClient;
use crate::mcp::errors::ToolError;
use crate::mcp::tools::{MCPTool, ToolResult};

/// List the workflow transitions currently available on an issue.
pub struct GetTransitionsTool {
    client: Arc<JiraClient>,
}

impl GetTransitionsTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MCPTool for GetTransitionsTool {
    fn name(&self) -> &str {
        "jira_get_transitions"
    }

    fn description(&self) -> &str {
        "List the workflow transitions available on a Jira issue from its current \
         status. Transition ids from this list are the valid inputs to \
         jira_transition_issue."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_key": {
                    "type": "string",
                    "description": "Issue key, e.g. 'PROJ-123'"
                }
            },
            "required": ["issue_key"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let issue_key = args["issue_key"].as_str().unwrap_or_default();

        debug!("Fetching transitions for {}", issue_key);
        let transitions = self.client.get_transitions(issue_key).await?;
        ToolResult::json(&json!({ "transitions": transitions }))
    }
}

/// Move an issue through a workflow transition, then return the re-fetched issue.
pub struct TransitionIssueTool {
    client: Arc<JiraClient>,
}

impl TransitionIssueTool {
    pub fn new(client: Arc<JiraClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MCPTool for TransitionIssueTool {
    fn name(&self) -> &str {
        "jira_transition_issue"
    }

    fn description(&self) -> &str {
        "Execute a workflow transition on a Jira issue, optionally attaching a \
         comment. The transition id must come from jira_get_transitions; Jira \
         rejects ids not valid from the issue's current status. The response is \
         the issue re-fetched after the transition."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_key": {
                    "type": "string",
                    "description": "Issue key, e.g. 'PROJ-123'"
                },
                "transition_id": {
                    "type": "string",
                    "description": "Transition id, as returned by jira_get_transitions"
                },
                "comment": {
                    "type": "string",
                    "description": "Plain-text comment recorded with the transition"
                }
            },
            "required": ["issue_key", "transition_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let issue_key = args["issue_key"].as_str().unwrap_or_default();
        let transition_id = args["transition_id"].as_str().unwrap_or_default();
        let comment = args["comment"].as_str();

        debug!("Transitioning {} via {}", issue_key, transition_id);
        let issue = self
            .client
            .transition_issue(issue_key, transition_id, comment)
            .await?;
        ToolResult::json(&issue)
    }
}
