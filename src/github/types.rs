//! Serde models for the GitHub REST v3 resources touched by the audits.
//!
//! Request types serialize exactly the fields the API expects; response
//! types default everything GitHub may omit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub allow_auto_merge: Option<bool>,
    #[serde(default)]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(default)]
    pub permissions: BTreeMap<String, bool>,
}

/// Body of `PATCH /repos/{org}/{repo}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepositoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchProtection {
    #[serde(default)]
    pub required_status_checks: Option<RequiredStatusChecks>,
    #[serde(default)]
    pub required_pull_request_reviews: Option<PullRequestReviews>,
    #[serde(default)]
    pub allow_force_pushes: Option<EnabledFlag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnabledFlag {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredStatusChecks {
    pub strict: bool,
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestReviews {
    #[serde(default)]
    pub dismiss_stale_reviews: bool,
    #[serde(default)]
    pub require_code_owner_reviews: bool,
    #[serde(default)]
    pub required_approving_review_count: u32,
}

/// Body of `PUT /repos/{org}/{repo}/branches/{branch}/protection`. The API
/// requires every top-level key to be present, `restrictions` as literal
/// `null` when unused.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectionRequest {
    pub required_status_checks: RequiredStatusChecks,
    pub required_pull_request_reviews: ReviewRequirementRequest,
    pub enforce_admins: bool,
    pub restrictions: Option<()>,
    pub allow_force_pushes: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequirementRequest {
    pub dismiss_stale_reviews: bool,
    pub require_code_owner_reviews: bool,
    pub required_approving_review_count: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelRequest {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hook {
    pub id: u64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub events: Vec<String>,
    #[serde(default)]
    pub config: HookConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Body of `POST`/`PATCH /repos/{org}/{repo}/hooks`. Repository webhooks
/// always use the name `"web"`.
#[derive(Debug, Clone, Serialize)]
pub struct HookRequest {
    pub name: String,
    pub active: bool,
    pub events: Vec<String>,
    pub config: HookConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionsWorkflow {
    pub id: u64,
    pub name: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionsWorkflowList {
    #[serde(default)]
    pub workflows: Vec<ActionsWorkflow>,
}

/// One entry of a `GET /repos/{org}/{repo}/contents/{path}` directory
/// listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}
