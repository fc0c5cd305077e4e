//! Repository settings audit
//!
//! Two settings are mandated for every repository: auto-merge enabled and
//! head branches deleted after merge.

use async_trait::async_trait;

use super::KeeperError;
use crate::github::{GithubClient, Repository, RepositoryPatch};

pub struct RepoSettingsVerifier<'a> {
    client: &'a GithubClient,
    org: &'a str,
    repo: &'a str,
}

#[async_trait]
trait RepoProblemHandler: Send + Sync {
    async fn handle_wrong_settings(&self, template: &RepositoryPatch) -> Result<(), KeeperError>;
}

struct LogRepoProblemHandler<'a> {
    repo: &'a str,
}

#[async_trait]
impl RepoProblemHandler for LogRepoProblemHandler<'_> {
    async fn handle_wrong_settings(&self, _template: &RepositoryPatch) -> Result<(), KeeperError> {
        println!(
            "The repository {} has outdated repo settings. Use --fix to update them.",
            self.repo
        );
        Ok(())
    }
}

struct FixRepoProblemHandler<'a> {
    client: &'a GithubClient,
    org: &'a str,
    repo: &'a str,
}

#[async_trait]
impl RepoProblemHandler for FixRepoProblemHandler<'_> {
    async fn handle_wrong_settings(&self, template: &RepositoryPatch) -> Result<(), KeeperError> {
        self.client
            .edit_repository(self.org, self.repo, template)
            .await?;
        Ok(())
    }
}

impl<'a> RepoSettingsVerifier<'a> {
    pub fn new(client: &'a GithubClient, org: &'a str, repo: &'a str) -> Self {
        Self { client, org, repo }
    }

    pub async fn verify(&self, fix: bool) -> Result<(), KeeperError> {
        let handler: Box<dyn RepoProblemHandler + 'a> = if fix {
            Box::new(FixRepoProblemHandler {
                client: self.client,
                org: self.org,
                repo: self.repo,
            })
        } else {
            Box::new(LogRepoProblemHandler { repo: self.repo })
        };
        let repository = self.client.repository(self.org, self.repo).await?;
        let template = repository_template();
        if settings_outdated(&repository, &template) {
            handler.handle_wrong_settings(&template).await?;
        }
        Ok(())
    }
}

fn repository_template() -> RepositoryPatch {
    RepositoryPatch {
        allow_auto_merge: Some(true),
        delete_branch_on_merge: Some(true),
    }
}

fn settings_outdated(repository: &Repository, template: &RepositoryPatch) -> bool {
    repository.allow_auto_merge != template.allow_auto_merge
        || repository.delete_branch_on_merge != template.delete_branch_on_merge
}
