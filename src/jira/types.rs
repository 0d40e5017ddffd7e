/// Projections of Jira REST v3 resources.
///
/// Every type here is a reduced, read-only view of the JSON returned by the
/// API. Nothing is cached or mutated locally; a value lives for the duration
/// of a single tool call and is serialized straight back to the caller.
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Field set requested from the search endpoint when the caller does not
/// supply an explicit list.
pub const DEFAULT_SEARCH_FIELDS: &[&str] = &[
    "summary",
    "status",
    "issuetype",
    "project",
    "priority",
    "assignee",
    "reporter",
    "created",
    "updated",
    "labels",
];

/// Reduced view of a Jira issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub key: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fix_versions: Vec<String>,
}

/// Status name plus its workflow category (`new`, `indeterminate`, `done`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueStatus {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// Reduced view of an issue comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<CommentVisibility>,
}

/// Group- or role-scoped visibility restriction on a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentVisibility {
    #[serde(rename = "type")]
    pub visibility_type: String,
    pub value: String,
}

/// A legal workflow move for an issue at the time of the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_status: Option<String>,
}

/// One page of search results.
///
/// At most one pagination signal is meaningful: a present `next_page_token`
/// always means more results may exist; otherwise `is_last` applies when the
/// deployment reports it; when neither is present the page is complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub issues: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_last: Option<bool>,
}

impl SearchPage {
    /// Whether the caller should expect further pages.
    pub fn has_more(&self) -> bool {
        if self.next_page_token.is_some() {
            return true;
        }
        match self.is_last {
            Some(is_last) => !is_last,
            None => false,
        }
    }
}

impl Issue {
    /// Project an issue from the raw API representation (`{id, key, fields}`).
    pub fn from_raw(raw: &Value) -> Option<Issue> {
        let key = raw.get("key")?.as_str()?.to_string();
        let id = raw
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let fields = raw.get("fields").cloned().unwrap_or_else(|| json!({}));

        Some(Issue {
            key,
            id,
            summary: str_field(&fields, "summary"),
            description: fields.get("description").and_then(flatten_adf),
            status: fields.get("status").and_then(|status| {
                Some(IssueStatus {
                    name: status.get("name")?.as_str()?.to_string(),
                    category: status
                        .get("statusCategory")
                        .and_then(|c| c.get("name"))
                        .and_then(|n| n.as_str())
                        .map(|s| s.to_string()),
                })
            }),
            issue_type: fields
                .get("issuetype")
                .and_then(|t| t.get("name"))
                .and_then(|n| n.as_str())
                .map(|s| s.to_string()),
            project: fields.get("project").and_then(|project| {
                Some(ProjectRef {
                    key: project.get("key")?.as_str()?.to_string(),
                    name: str_field(project, "name"),
                })
            }),
            priority: fields
                .get("priority")
                .and_then(|p| p.get("name"))
                .and_then(|n| n.as_str())
                .map(|s| s.to_string()),
            assignee: fields.get("assignee").and_then(user_ref),
            reporter: fields.get("reporter").and_then(user_ref),
            created: str_field(&fields, "created"),
            updated: str_field(&fields, "updated"),
            labels: string_array(&fields, "labels"),
            components: named_array(&fields, "components"),
            fix_versions: named_array(&fields, "fixVersions"),
        })
    }
}

impl Comment {
    /// Project a comment from the raw API representation.
    pub fn from_raw(raw: &Value) -> Option<Comment> {
        let id = raw.get("id")?.as_str()?.to_string();

        Some(Comment {
            id,
            author: raw
                .get("author")
                .and_then(|a| a.get("displayName"))
                .and_then(|n| n.as_str())
                .map(|s| s.to_string()),
            body: raw.get("body").and_then(flatten_adf),
            created: str_field(raw, "created"),
            updated: str_field(raw, "updated"),
            visibility: raw.get("visibility").and_then(|vis| {
                Some(CommentVisibility {
                    visibility_type: vis.get("type")?.as_str()?.to_string(),
                    value: vis.get("value")?.as_str()?.to_string(),
                })
            }),
        })
    }
}

impl Transition {
    /// Project a transition from the raw API representation.
    pub fn from_raw(raw: &Value) -> Option<Transition> {
        Some(Transition {
            id: raw.get("id")?.as_str()?.to_string(),
            name: raw.get("name")?.as_str()?.to_string(),
            to_status: raw
                .get("to")
                .and_then(|to| to.get("name"))
                .and_then(|n| n.as_str())
                .map(|s| s.to_string()),
        })
    }
}

impl SearchPage {
    /// Project a search response, picking up whichever pagination signal the
    /// deployment generation returned.
    pub fn from_raw(raw: &Value) -> SearchPage {
        let issues = raw
            .get("issues")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(Issue::from_raw).collect())
            .unwrap_or_default();

        SearchPage {
            issues,
            total: raw.get("total").and_then(|v| v.as_u64()),
            next_page_token: str_field(raw, "nextPageToken"),
            is_last: raw.get("isLast").and_then(|v| v.as_bool()),
        }
    }
}

/// Flatten a description/comment body to plain text.
///
/// REST v3 returns bodies as Atlassian Document Format trees; older
/// deployments return plain strings. Text nodes are collected in document
/// order, paragraphs separated by newlines.
pub fn flatten_adf(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(_) => {
            let mut paragraphs = Vec::new();
            collect_adf_text(value, &mut paragraphs);
            if paragraphs.is_empty() {
                None
            } else {
                Some(paragraphs.join("\n"))
            }
        }
        _ => None,
    }
}

fn collect_adf_text(node: &Value, out: &mut Vec<String>) {
    if let Some(children) = node.get("content").and_then(|c| c.as_array()) {
        let mut line = String::new();
        for child in children {
            match child.get("type").and_then(|t| t.as_str()) {
                Some("text") => {
                    if let Some(text) = child.get("text").and_then(|t| t.as_str()) {
                        line.push_str(text);
                    }
                }
                _ => collect_adf_text(child, out),
            }
        }
        if !line.is_empty() {
            out.push(line);
        }
    }
}

/// Wrap plain text in a minimal ADF document for request bodies.
pub fn adf_document(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [
            {
                "type": "paragraph",
                "content": [
                    { "type": "text", "text": text }
                ]
            }
        ]
    })
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn user_ref(value: &Value) -> Option<UserRef> {
    if value.is_null() {
        return None;
    }
    Some(UserRef {
        display_name: str_field(value, "displayName"),
        account_id: str_field(value, "accountId"),
    })
}

fn string_array(fields: &Value, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn named_array(fields: &Value, key: &str) -> Vec<String> {
    fields
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.get("name"))
                .filter_map(|n| n.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_issue() -> Value {
        json!({
            "id": "10042",
            "key": "PROJ-7",
            "fields": {
                "summary": "Fix login flow",
                "description": {
                    "type": "doc",
                    "version": 1,
                    "content": [
                        {
                            "type": "paragraph",
                            "content": [
                                { "type": "text", "text": "Users cannot " },
                                { "type": "text", "text": "log in." }
                            ]
                        },
                        {
                            "type": "paragraph",
                            "content": [
                                { "type": "text", "text": "Seen since Tuesday." }
                            ]
                        }
                    ]
                },
                "status": {
                    "name": "In Progress",
                    "statusCategory": { "name": "In Progress" }
                },
                "issuetype": { "name": "Bug" },
                "project": { "key": "PROJ", "name": "Project" },
                "priority": { "name": "High" },
                "assignee": {
                    "displayName": "Ada Lovelace",
                    "accountId": "5b10ac8d82e05b22cc7d4ef5"
                },
                "reporter": null,
                "created": "2024-03-01T09:30:00.000+0000",
                "updated": "2024-03-02T10:00:00.000+0000",
                "labels": ["auth", "regression"],
                "components": [{ "name": "backend" }],
                "fixVersions": [{ "name": "1.2.0" }]
            }
        })
    }

    #[test]
    fn test_issue_projection() {
        let issue = Issue::from_raw(&sample_issue()).unwrap();

        assert_eq!(issue.key, "PROJ-7");
        assert_eq!(issue.id, "10042");
        assert_eq!(issue.summary.as_deref(), Some("Fix login flow"));
        assert_eq!(
            issue.description.as_deref(),
            Some("Users cannot log in.\nSeen since Tuesday.")
        );
        assert_eq!(issue.status.as_ref().unwrap().name, "In Progress");
        assert_eq!(issue.issue_type.as_deref(), Some("Bug"));
        assert_eq!(issue.project.as_ref().unwrap().key, "PROJ");
        assert_eq!(issue.priority.as_deref(), Some("High"));
        assert_eq!(
            issue.assignee.as_ref().unwrap().display_name.as_deref(),
            Some("Ada Lovelace")
        );
        assert!(issue.reporter.is_none());
        assert_eq!(issue.labels, vec!["auth", "regression"]);
        assert_eq!(issue.components, vec!["backend"]);
        assert_eq!(issue.fix_versions, vec!["1.2.0"]);
    }

    #[test]
    fn test_issue_projection_minimal_fields() {
        let raw = json!({ "id": "1", "key": "PROJ-1", "fields": {} });
        let issue = Issue::from_raw(&raw).unwrap();

        assert_eq!(issue.key, "PROJ-1");
        assert!(issue.summary.is_none());
        assert!(issue.status.is_none());
        assert!(issue.labels.is_empty());
    }

    #[test]
    fn test_issue_projection_is_deterministic() {
        let raw = sample_issue();
        let first = serde_json::to_value(Issue::from_raw(&raw).unwrap()).unwrap();
        let second = serde_json::to_value(Issue::from_raw(&raw).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_comment_projection_with_visibility() {
        let raw = json!({
            "id": "20001",
            "author": { "displayName": "Grace Hopper" },
            "body": "Plain string body",
            "created": "2024-03-01T12:00:00.000+0000",
            "visibility": { "type": "role", "value": "Administrators" }
        });

        let comment = Comment::from_raw(&raw).unwrap();
        assert_eq!(comment.author.as_deref(), Some("Grace Hopper"));
        assert_eq!(comment.body.as_deref(), Some("Plain string body"));
        let visibility = comment.visibility.unwrap();
        assert_eq!(visibility.visibility_type, "role");
        assert_eq!(visibility.value, "Administrators");
    }

    #[test]
    fn test_transition_projection() {
        let raw = json!({
            "id": "31",
            "name": "Start Progress",
            "to": { "name": "In Progress" }
        });

        let transition = Transition::from_raw(&raw).unwrap();
        assert_eq!(transition.id, "31");
        assert_eq!(transition.name, "Start Progress");
        assert_eq!(transition.to_status.as_deref(), Some("In Progress"));
    }

    #[test]
    fn test_search_page_with_token() {
        let raw = json!({
            "issues": [{ "id": "1", "key": "PROJ-1", "fields": {} }],
            "nextPageToken": "opaque-token"
        });

        let page = SearchPage::from_raw(&raw);
        assert_eq!(page.issues.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("opaque-token"));
        assert!(page.has_more());
    }

    #[test]
    fn test_search_page_with_is_last() {
        let page = SearchPage::from_raw(&json!({ "issues": [], "isLast": true }));
        assert!(!page.has_more());

        let page = SearchPage::from_raw(&json!({ "issues": [], "isLast": false }));
        assert!(page.has_more());
    }

    #[test]
    fn test_search_page_without_signals_is_complete() {
        let page = SearchPage::from_raw(&json!({ "issues": [], "total": 0 }));
        assert!(!page.has_more());
        assert_eq!(page.total, Some(0));
    }

    #[test]
    fn test_token_takes_precedence_over_is_last() {
        let page = SearchPage::from_raw(&json!({
            "issues": [],
            "isLast": true,
            "nextPageToken": "t"
        }));
        assert!(page.has_more());
    }

    #[test]
    fn test_flatten_adf_ignores_non_text() {
        assert_eq!(flatten_adf(&json!(null)), None);
        assert_eq!(flatten_adf(&json!({ "type": "doc", "content": [] })), None);
        assert_eq!(
            flatten_adf(&json!("already plain")).as_deref(),
            Some("already plain")
        );
    }

    #[test]
    fn test_adf_document_shape() {
        let doc = adf_document("hello");
        assert_eq!(doc["type"], "doc");
        assert_eq!(doc["version"], 1);
        assert_eq!(doc["content"][0]["content"][0]["text"], "hello");
        // Round trip through the flattener.
        assert_eq!(flatten_adf(&doc).as_deref(), Some("hello"));
    }
}
