//! Branch protection audit
//!
//! Derives the required status checks of a repository from its workflow
//! definitions and makes sure the default branch enforces them, along with
//! the standard review rules: one approving review, stale reviews
//! dismissed, code-owner reviews required, force pushes forbidden.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::info;

use super::checks;
use super::KeeperError;
use crate::github::{
    BranchProtection, GithubClient, ProtectionRequest, PullRequestReviews, RequiredStatusChecks,
    ReviewRequirementRequest,
};

pub struct BranchProtectionVerifier<'a> {
    client: &'a GithubClient,
    org: &'a str,
    repo: &'a str,
}

#[async_trait]
trait ProtectionProblemHandler: Send + Sync {
    async fn create_protection(
        &self,
        branch: &str,
        request: &ProtectionRequest,
    ) -> Result<(), KeeperError>;

    async fn update_protection(
        &self,
        branch: &str,
        request: &ProtectionRequest,
    ) -> Result<(), KeeperError>;
}

struct LogProtectionProblemHandler<'a> {
    org: &'a str,
    repo: &'a str,
}

#[async_trait]
impl ProtectionProblemHandler for LogProtectionProblemHandler<'_> {
    async fn create_protection(
        &self,
        branch: &str,
        _request: &ProtectionRequest,
    ) -> Result<(), KeeperError> {
        println!(
            "{}/{} does not have a branch protection rule for default branch {}. Use --fix to create it. This error can also happen if you don't have admin privileges on the repo.",
            self.org, self.repo, branch
        );
        Ok(())
    }

    async fn update_protection(
        &self,
        branch: &str,
        _request: &ProtectionRequest,
    ) -> Result<(), KeeperError> {
        println!(
            "{}/{} has a branch protection for default branch {} that is not compliant to our standards. Use --fix to update.",
            self.org, self.repo, branch
        );
        Ok(())
    }
}

struct FixProtectionProblemHandler<'a> {
    client: &'a GithubClient,
    org: &'a str,
    repo: &'a str,
}

#[async_trait]
impl ProtectionProblemHandler for FixProtectionProblemHandler<'_> {
    async fn create_protection(
        &self,
        branch: &str,
        request: &ProtectionRequest,
    ) -> Result<(), KeeperError> {
        self.client
            .update_branch_protection(self.org, self.repo, branch, request)
            .await?;
        println!(
            "Successfully created branch protection for {}/{}/{}.",
            self.org, self.repo, branch
        );
        Ok(())
    }

    async fn update_protection(
        &self,
        branch: &str,
        request: &ProtectionRequest,
    ) -> Result<(), KeeperError> {
        self.create_protection(branch, request).await
    }
}

impl<'a> BranchProtectionVerifier<'a> {
    pub fn new(client: &'a GithubClient, org: &'a str, repo: &'a str) -> Self {
        Self { client, org, repo }
    }

    pub async fn verify(&self, fix: bool) -> Result<(), KeeperError> {
        let handler = self.problem_handler(fix);
        let branch = self.default_branch().await?;
        let mut request = self.create_protection_request().await?;
        match self
            .client
            .branch_protection(self.org, self.repo, &branch)
            .await?
        {
            None => handler.create_protection(&branch, &request).await?,
            Some(existing) => {
                if !is_compliant(&existing, &request) {
                    merge_existing_checks(&existing, &mut request);
                    handler.update_protection(&branch, &request).await?;
                } else {
                    info!(repo = self.repo, "branch protection is compliant");
                }
            }
        }
        Ok(())
    }

    fn problem_handler(&self, fix: bool) -> Box<dyn ProtectionProblemHandler + 'a> {
        if fix {
            Box::new(FixProtectionProblemHandler {
                client: self.client,
                org: self.org,
                repo: self.repo,
            })
        } else {
            Box::new(LogProtectionProblemHandler {
                org: self.org,
                repo: self.repo,
            })
        }
    }

    async fn default_branch(&self) -> Result<String, KeeperError> {
        let repository = self.client.repository(self.org, self.repo).await?;
        repository
            .default_branch
            .ok_or_else(|| KeeperError::MissingDefaultBranch {
                repo: self.repo.to_string(),
            })
    }

    async fn create_protection_request(&self) -> Result<ProtectionRequest, KeeperError> {
        let checks = self.collect_required_checks().await?;
        Ok(ProtectionRequest {
            required_status_checks: RequiredStatusChecks {
                strict: true,
                contexts: checks.into_iter().collect(),
            },
            required_pull_request_reviews: ReviewRequirementRequest {
                dismiss_stale_reviews: true,
                require_code_owner_reviews: true,
                required_approving_review_count: 1,
            },
            enforce_admins: false,
            restrictions: None,
            allow_force_pushes: false,
        })
    }

    async fn collect_required_checks(&self) -> Result<BTreeSet<String>, KeeperError> {
        let entries = self
            .client
            .list_directory(self.org, self.repo, ".github/workflows")
            .await?;
        let mut files = Vec::new();
        for entry in entries.iter().filter(|entry| entry.entry_type == "file") {
            let content = self
                .client
                .file_content(self.org, self.repo, &entry.path)
                .await?;
            files.push((entry.path.clone(), content));
        }
        let collected = checks::collect_required_checks(files)?;
        Ok(collected.checks)
    }
}

fn is_compliant(existing: &BranchProtection, request: &ProtectionRequest) -> bool {
    let force_pushes_ok = existing
        .allow_force_pushes
        .as_ref()
        .map(|flag| flag.enabled)
        == Some(request.allow_force_pushes);
    force_pushes_ok
        && reviews_compliant(
            existing.required_pull_request_reviews.as_ref(),
            &request.required_pull_request_reviews,
        )
        && status_checks_compliant(
            existing.required_status_checks.as_ref(),
            &request.required_status_checks,
        )
}

fn reviews_compliant(
    existing: Option<&PullRequestReviews>,
    request: &ReviewRequirementRequest,
) -> bool {
    existing.is_some_and(|existing| {
        existing.required_approving_review_count >= request.required_approving_review_count
            && existing.dismiss_stale_reviews == request.dismiss_stale_reviews
            && existing.require_code_owner_reviews == request.require_code_owner_reviews
    })
}

/// The existing protection may require more checks than the template; it is
/// compliant as long as it covers every required one and agrees on strict
/// mode.
fn status_checks_compliant(
    existing: Option<&RequiredStatusChecks>,
    request: &RequiredStatusChecks,
) -> bool {
    existing.is_some_and(|existing| {
        request
            .contexts
            .iter()
            .all(|required| existing.contexts.contains(required))
            && existing.strict == request.strict
    })
}

/// Keep checks that were added to the protection by hand so an update does
/// not drop them.
fn merge_existing_checks(existing: &BranchProtection, request: &mut ProtectionRequest) {
    let Some(existing_checks) = existing.required_status_checks.as_ref() else {
        return;
    };
    for check in &existing_checks.contexts {
        if !request.required_status_checks.contexts.contains(check) {
            request
                .required_status_checks
                .contexts
                .push(check.clone());
        }
    }
}
