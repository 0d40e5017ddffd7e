/// Jira REST v3 integration: a stateless HTTP façade plus the reduced
/// projections of Jira's resources that tools return to the caller.
pub mod client;
pub mod types;

pub use self::client::{JiraClient, JiraError, SearchRequest, VisibilityRestriction};
pub use self::types::{Comment, Issue, SearchPage, Transition};
