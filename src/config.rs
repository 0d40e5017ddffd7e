use base64::Engine;
use thiserror::Error;

/// Errors raised while reading connection settings from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("environment variable {0} is empty")]
    EmptyVar(&'static str),
}

/// Connection settings for one Jira instance.
///
/// All three values are required; the server refuses to start without them.
#[derive(Debug, Clone)]
pub struct JiraConfig {
    /// Instance base URL without the `/rest/api/3` suffix,
    /// e.g. `https://example.atlassian.net`.
    pub base_url: String,

    /// Account username or email paired with the API token.
    pub username: String,

    /// API token used for Basic authentication.
    pub api_token: String,
}

impl JiraConfig {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            username: username.into(),
            api_token: api_token.into(),
        }
    }

    /// Load settings from `JIRA_BASE_URL`, `JIRA_USERNAME` (or `JIRA_EMAIL`)
    /// and `JIRA_API_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = require_var("JIRA_BASE_URL")?;
        let username = match std::env::var("JIRA_USERNAME") {
            Ok(value) if !value.trim().is_empty() => value,
            _ => require_var("JIRA_EMAIL")
                .map_err(|_| ConfigError::MissingVar("JIRA_USERNAME"))?,
        };
        let api_token = require_var("JIRA_API_TOKEN")?;

        Ok(Self::new(base_url, username, api_token))
    }

    /// Value for the `Authorization` header: base64-encoded `username:token`.
    pub fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.api_token);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyVar(name)),
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::MissingVar(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = JiraConfig::new("https://example.atlassian.net/", "user", "token");
        assert_eq!(config.base_url, "https://example.atlassian.net");

        let config = JiraConfig::new("https://example.atlassian.net", "user", "token");
        assert_eq!(config.base_url, "https://example.atlassian.net");
    }

    #[test]
    fn test_basic_auth_header_encoding() {
        let config = JiraConfig::new("https://example.atlassian.net", "user@example.com", "token123");
        // base64("user@example.com:token123")
        assert_eq!(
            config.basic_auth_header(),
            "Basic dXNlckBleGFtcGxlLmNvbTp0b2tlbjEyMw=="
        );
    }
}
