//! Repository audits
//!
//! Each audit compares the live configuration of a repository against the
//! team-wide template and routes findings through a problem handler: the
//! dry-run handler prints what would change, the fixing handler applies the
//! change through the API. `--fix` on the CLI selects the handler.

pub mod branch_protection;
pub mod checks;
pub mod labels;
pub mod repo_settings;
pub mod scheduled;
pub mod webhooks;

pub use branch_protection::BranchProtectionVerifier;
pub use checks::{collect_required_checks, RequiredChecks};
pub use labels::unify_labels;
pub use repo_settings::RepoSettingsVerifier;
pub use scheduled::reactivate_workflows;
pub use webhooks::WebHookVerifier;

use crate::config::ConfigError;
use crate::github::GithubError;
use crate::workflow::WorkflowError;

#[derive(Debug, thiserror::Error)]
pub enum KeeperError {
    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("repository {repo} has no default branch")]
    MissingDefaultBranch { repo: String },
}

impl KeeperError {
    /// Workflow validation errors stay fatal for the whole run even after
    /// being wrapped; everything else concerns a single repository.
    pub fn is_validation(&self) -> bool {
        matches!(self, KeeperError::Workflow(error) if error.is_validation())
    }
}

/// Order-insensitive comparison of two string lists.
pub(crate) fn strings_equal_ignoring_order(left: &[String], right: &[String]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut left = left.to_vec();
    let mut right = right.to_vec();
    left.sort();
    right.sort();
    left == right
}
