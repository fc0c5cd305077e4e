//! GitHub REST API access
//!
//! - `client` - thin typed client over reqwest
//! - `types` - serde models for the touched resources

pub mod client;
pub mod types;

pub use client::{GithubClient, GithubError, DEFAULT_API_URL};
pub use types::{
    ActionsWorkflow, BranchProtection, DirectoryEntry, EnabledFlag, Hook, HookConfig, HookRequest,
    Label, LabelRequest, ProtectionRequest, PullRequestReviews, Repository, RepositoryPatch,
    RequiredStatusChecks, ReviewRequirementRequest,
};
