/// Stateless HTTP façade over the Jira REST v3 API.
///
/// One method per remote operation. Every method performs exactly one HTTP
/// call, except the mutating operations which confirm by re-fetching the
/// issue (create+fetch, update+fetch, transition+fetch). There is no retry,
/// no caching and no rate limiting; failures surface immediately.
use reqwest::{header, Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::JiraConfig;
use crate::jira::types::{
    adf_document, Comment, Issue, SearchPage, Transition, DEFAULT_SEARCH_FIELDS,
};

/// Timeout applied to every request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors surfaced by the façade. No variant is retried.
#[derive(Debug, thiserror::Error)]
pub enum JiraError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Jira API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}

/// Parameters for one search call, with documented defaults.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// JQL filter; ordering comes entirely from its `ORDER BY` clause.
    pub jql: String,
    /// Page-size bound. `None` means the default of 50.
    pub max_results: Option<u32>,
    /// Continuation token from a prior page, passed back verbatim.
    pub next_page_token: Option<String>,
    /// Explicit field list; `None` means [`DEFAULT_SEARCH_FIELDS`].
    pub fields: Option<Vec<String>>,
}

impl SearchRequest {
    pub const DEFAULT_MAX_RESULTS: u32 = 50;

    fn body(&self) -> Value {
        let fields: Vec<String> = match &self.fields {
            Some(fields) => fields.clone(),
            None => DEFAULT_SEARCH_FIELDS.iter().map(|s| s.to_string()).collect(),
        };

        let mut body = json!({
            "jql": self.jql,
            "maxResults": self.max_results.unwrap_or(Self::DEFAULT_MAX_RESULTS),
            "fields": fields,
        });
        if let Some(token) = &self.next_page_token {
            body["nextPageToken"] = json!(token);
        }
        body
    }
}

/// Restriction attached to a new comment.
#[derive(Debug, Clone)]
pub struct VisibilityRestriction {
    /// `"group"` or `"role"`.
    pub visibility_type: String,
    pub value: String,
}

pub struct JiraClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self, JiraError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            auth_header: config.basic_auth_header(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/3{}", self.base_url, path)
    }

    /// Issue one HTTP call and normalize any failure into a [`JiraError`].
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, JiraError> {
        let url = self.api_url(path);
        debug!("Jira request: {} {}", method, url);

        let mut builder = self
            .http
            .request(method, &url)
            .header(header::AUTHORIZATION, &self.auth_header)
            .header(header::ACCEPT, "application/json")
            .query(query);

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        if text.trim().is_empty() {
            // 204 No Content from update/transition calls.
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| JiraError::UnexpectedResponse(format!("invalid JSON body: {}", e)))
    }

    /// Run a JQL search and return one page of projected issues.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPage, JiraError> {
        let raw = self
            .request(Method::POST, "/search/jql", &[], Some(&request.body()))
            .await?;
        Ok(SearchPage::from_raw(&raw))
    }

    /// Fetch one issue by key.
    pub async fn get_issue(
        &self,
        issue_key: &str,
        fields: Option<&[String]>,
    ) -> Result<Issue, JiraError> {
        let query = match fields {
            Some(fields) if !fields.is_empty() => {
                vec![("fields", fields.join(","))]
            }
            _ => Vec::new(),
        };

        let raw = self
            .request(Method::GET, &format!("/issue/{}", issue_key), &query, None)
            .await?;

        Issue::from_raw(&raw)
            .ok_or_else(|| JiraError::UnexpectedResponse("issue payload missing key".to_string()))
    }

    /// Create an issue, then fetch and return the full created entity.
    ///
    /// Two calls, not atomic: a crash between them leaves a created issue
    /// whose key is only reported via the second call's success.
    pub async fn create_issue(&self, fields: Value) -> Result<Issue, JiraError> {
        let body = json!({ "fields": fields });
        let raw = self
            .request(Method::POST, "/issue", &[], Some(&body))
            .await?;

        let key = raw
            .get("key")
            .and_then(|k| k.as_str())
            .ok_or_else(|| {
                JiraError::UnexpectedResponse("create response missing issue key".to_string())
            })?
            .to_string();

        self.get_issue(&key, None).await
    }

    /// Update issue fields, then fetch the issue to confirm. The fetched
    /// state may already reflect a concurrent external mutation; the API
    /// offers no compare-and-swap to close that gap.
    pub async fn update_issue(&self, issue_key: &str, fields: Value) -> Result<Issue, JiraError> {
        let body = json!({ "fields": fields });
        self.request(
            Method::PUT,
            &format!("/issue/{}", issue_key),
            &[],
            Some(&body),
        )
        .await?;

        self.get_issue(issue_key, None).await
    }

    /// Enumerate the legal transitions for an issue right now. Never cached;
    /// the workflow configuration may change between calls.
    pub async fn get_transitions(&self, issue_key: &str) -> Result<Vec<Transition>, JiraError> {
        let raw = self
            .request(
                Method::GET,
                &format!("/issue/{}/transitions", issue_key),
                &[],
                None,
            )
            .await?;

        let transitions = raw
            .get("transitions")
            .and_then(|t| t.as_array())
            .map(|items| items.iter().filter_map(Transition::from_raw).collect())
            .unwrap_or_default();

        Ok(transitions)
    }

    /// Execute a transition, then fetch the issue to report its new status.
    pub async fn transition_issue(
        &self,
        issue_key: &str,
        transition_id: &str,
        comment: Option<&str>,
    ) -> Result<Issue, JiraError> {
        let mut body = json!({
            "transition": { "id": transition_id }
        });
        if let Some(comment) = comment {
            body["update"] = json!({
                "comment": [ { "add": { "body": adf_document(comment) } } ]
            });
        }

        self.request(
            Method::POST,
            &format!("/issue/{}/transitions", issue_key),
            &[],
            Some(&body),
        )
        .await?;

        self.get_issue(issue_key, None).await
    }

    /// List comments on an issue.
    pub async fn get_comments(
        &self,
        issue_key: &str,
        max_results: u32,
    ) -> Result<Vec<Comment>, JiraError> {
        let raw = self
            .request(
                Method::GET,
                &format!("/issue/{}/comment", issue_key),
                &[("maxResults", max_results.to_string())],
                None,
            )
            .await?;

        let comments = raw
            .get("comments")
            .and_then(|c| c.as_array())
            .map(|items| items.iter().filter_map(Comment::from_raw).collect())
            .unwrap_or_default();

        Ok(comments)
    }

    /// Add a comment, optionally restricted to a group or role.
    pub async fn add_comment(
        &self,
        issue_key: &str,
        body_text: &str,
        visibility: Option<&VisibilityRestriction>,
    ) -> Result<Comment, JiraError> {
        let mut body = json!({ "body": adf_document(body_text) });
        if let Some(visibility) = visibility {
            body["visibility"] = json!({
                "type": visibility.visibility_type,
                "value": visibility.value,
            });
        }

        let raw = self
            .request(
                Method::POST,
                &format!("/issue/{}/comment", issue_key),
                &[],
                Some(&body),
            )
            .await?;

        Comment::from_raw(&raw).ok_or_else(|| {
            JiraError::UnexpectedResponse("comment payload missing id".to_string())
        })
    }
}

/// Normalize a non-2xx response into one error carrying the HTTP status and
/// any server-supplied messages concatenated.
fn api_error(status: StatusCode, body: &str) -> JiraError {
    let mut messages = Vec::new();

    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(items) = parsed.get("errorMessages").and_then(|m| m.as_array()) {
            for item in items {
                if let Some(text) = item.as_str() {
                    messages.push(text.to_string());
                }
            }
        }
        if let Some(errors) = parsed.get("errors").and_then(|e| e.as_object()) {
            for (field, detail) in errors {
                if let Some(text) = detail.as_str() {
                    messages.push(format!("{}: {}", field, text));
                }
            }
        }
    }

    let message = if messages.is_empty() {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request rejected")
                .to_string()
        } else {
            trimmed.chars().take(500).collect()
        }
    } else {
        messages.join("; ")
    };

    JiraError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> JiraClient {
        let config = JiraConfig::new("https://example.atlassian.net", "user", "token");
        JiraClient::new(&config).unwrap()
    }

    #[test]
    fn test_api_url_joining() {
        let client = test_client();
        assert_eq!(
            client.api_url("/issue/PROJ-1"),
            "https://example.atlassian.net/rest/api/3/issue/PROJ-1"
        );
    }

    #[test]
    fn test_search_request_defaults() {
        let request = SearchRequest {
            jql: "project = PROJ".to_string(),
            ..Default::default()
        };
        let body = request.body();

        assert_eq!(body["jql"], "project = PROJ");
        assert_eq!(body["maxResults"], 50);
        assert_eq!(
            body["fields"].as_array().unwrap().len(),
            DEFAULT_SEARCH_FIELDS.len()
        );
        assert!(body.get("nextPageToken").is_none());
    }

    #[test]
    fn test_search_request_token_passed_verbatim() {
        let request = SearchRequest {
            jql: "project = PROJ".to_string(),
            max_results: Some(1),
            next_page_token: Some("CAEaAggD".to_string()),
            fields: Some(vec!["summary".to_string()]),
        };
        let body = request.body();

        assert_eq!(body["maxResults"], 1);
        assert_eq!(body["nextPageToken"], "CAEaAggD");
        assert_eq!(body["fields"], serde_json::json!(["summary"]));
    }

    #[test]
    fn test_api_error_concatenates_messages() {
        let body = r#"{
            "errorMessages": ["Issue does not exist or you do not have permission to see it."],
            "errors": { "summary": "Summary is required." }
        }"#;

        let error = api_error(StatusCode::BAD_REQUEST, body);
        match error {
            JiraError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("Issue does not exist"));
                assert!(message.contains("summary: Summary is required."));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_status_reason() {
        let error = api_error(StatusCode::UNAUTHORIZED, "");
        match error {
            JiraError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_uses_raw_body_when_not_json() {
        let error = api_error(StatusCode::BAD_GATEWAY, "<html>proxy error</html>");
        match error {
            JiraError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<html>proxy error</html>");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
