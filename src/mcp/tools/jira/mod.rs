/// Jira tools exposed over MCP: search, read, create, update, transition
/// and comment operations, each a thin schema + handler pair over the
/// HTTP façade.
pub mod comments;
pub mod create_issue;
pub mod get_issue;
pub mod search_issues;
pub mod transitions;
pub mod update_issue;

pub use self::comments::{AddCommentTool, GetCommentsTool};
pub use self::create_issue::CreateIssueTool;
pub use self::get_issue::GetIssueTool;
pub use self::search_issues::SearchIssuesTool;
pub use self::transitions::{GetTransitionsTool, TransitionIssueTool};
pub use self::update_issue::UpdateIssueTool;

use serde_json::{json, Value};

/// How to interpret an assignee string supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeKind {
    AccountId,
    Username,
}

impl AssigneeKind {
    pub fn from_arg(value: Option<&str>) -> Option<AssigneeKind> {
        match value {
            Some("account_id") => Some(AssigneeKind::AccountId),
            Some("username") => Some(AssigneeKind::Username),
            _ => None,
        }
    }
}

/// Build the `assignee` field for a create/update body.
///
/// When the caller does not say which kind of identifier they passed, a
/// string containing `@` or longer than 20 characters is treated as a cloud
/// account id, anything else as a legacy username. The heuristic is fragile
/// by nature; callers that know should say so via `assignee_kind`.
pub fn assignee_field(identifier: &str, kind: Option<AssigneeKind>) -> Value {
    let kind = kind.unwrap_or_else(|| {
        if identifier.contains('@') || identifier.len() > 20 {
            AssigneeKind::AccountId
        } else {
            AssigneeKind::Username
        }
    });

    match kind {
        AssigneeKind::AccountId => json!({ "accountId": identifier }),
        AssigneeKind::Username => json!({ "name": identifier }),
    }
}

/// Pull an optional list of strings out of validated arguments.
pub(crate) fn string_list(args: &Value, key: &str) -> Option<Vec<String>> {
    args.get(key).and_then(|v| v.as_array()).map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect()
    })
}
