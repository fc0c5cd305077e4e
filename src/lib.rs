//! # Repo Keeper
//!
//! Audits and repairs the GitHub configuration of an organization's
//! repositories: branch protection rules, labels, webhooks and repository
//! settings.
//!
//! ## Features
//!
//! - **Workflow parsing** - Derive required status checks from GitHub
//!   Actions workflow files, including build-matrix expansion
//! - **Branch protection** - Enforce required checks and review rules on
//!   the default branch
//! - **Labels, webhooks, settings** - Compare against the team templates
//!   and repair the differences
//! - **Dry-run first** - Every audit prints findings; `--fix` applies them
//!
//! ## Quick Start - Required Checks
//!
//! ```rust
//! use repo_keeper::workflow::WorkflowDefinition;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let definition = WorkflowDefinition::parse(
//!         r#"
//! name: CI Build
//! on:
//!   push:
//! jobs:
//!   build:
//!     strategy:
//!       matrix:
//!         go: ["1.21", "1.22"]
//!     name: Build with Go ${{ matrix.go }}
//! "#,
//!     )?;
//!
//!     assert!(definition.trigger().triggers_on_push_or_pull_request());
//!     let names = definition.job_names()?;
//!     assert!(names.contains("Build with Go 1.21"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod github;
pub mod keeper;
pub mod workflow;

// Re-export main types
pub use config::{ConfigError, KeeperConfig, Secrets};
pub use github::{GithubClient, GithubError};
pub use keeper::{
    collect_required_checks, reactivate_workflows, unify_labels, BranchProtectionVerifier,
    KeeperError, RepoSettingsVerifier, RequiredChecks, WebHookVerifier,
};
pub use workflow::{
    LoadError, MatrixValue, ScalarValue, TriggerClassification, ValidationError,
    WorkflowDefinition, WorkflowError, WorkflowLoader,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{KeeperConfig, Secrets};
    pub use crate::github::GithubClient;
    pub use crate::keeper::{
        collect_required_checks, reactivate_workflows, unify_labels, BranchProtectionVerifier,
        KeeperError, RepoSettingsVerifier, WebHookVerifier,
    };
    pub use crate::workflow::{
        TriggerClassification, ValidationError, WorkflowDefinition, WorkflowError, WorkflowLoader,
    };
}
