//! Webhook audit
//!
//! Makes sure each repository forwards issue and security events to the
//! team Slack channel. The hook is matched by its target URL, which comes
//! from the secrets store.

use async_trait::async_trait;

use super::{strings_equal_ignoring_order, KeeperError};
use crate::config::{ConfigError, Secrets};
use crate::github::{GithubClient, Hook, HookConfig, HookRequest};

const SLACK_WEBHOOK_SECRET: &str = "issues_slack_webhook_url";

pub struct WebHookVerifier<'a> {
    client: &'a GithubClient,
    org: &'a str,
    repo: &'a str,
    secrets: &'a Secrets,
}

#[async_trait]
trait WebHookProblemHandler: Send + Sync {
    async fn create_hook(&self, template: &HookRequest) -> Result<(), KeeperError>;
    async fn update_hook(&self, existing: &Hook, template: &HookRequest)
        -> Result<(), KeeperError>;
}

struct LogWebHookProblemHandler<'a> {
    repo: &'a str,
}

#[async_trait]
impl WebHookProblemHandler for LogWebHookProblemHandler<'_> {
    async fn create_hook(&self, _template: &HookRequest) -> Result<(), KeeperError> {
        println!(
            "Missing required web hook for repository {}. Use --fix to create it.",
            self.repo
        );
        Ok(())
    }

    async fn update_hook(
        &self,
        _existing: &Hook,
        _template: &HookRequest,
    ) -> Result<(), KeeperError> {
        println!(
            "Outdated web hook for repository {}. Use --fix to update it.",
            self.repo
        );
        Ok(())
    }
}

struct FixWebHookProblemHandler<'a> {
    client: &'a GithubClient,
    org: &'a str,
    repo: &'a str,
}

#[async_trait]
impl WebHookProblemHandler for FixWebHookProblemHandler<'_> {
    async fn create_hook(&self, template: &HookRequest) -> Result<(), KeeperError> {
        self.client
            .create_hook(self.org, self.repo, template)
            .await?;
        Ok(())
    }

    async fn update_hook(
        &self,
        existing: &Hook,
        template: &HookRequest,
    ) -> Result<(), KeeperError> {
        self.client
            .edit_hook(self.org, self.repo, existing.id, template)
            .await?;
        Ok(())
    }
}

impl<'a> WebHookVerifier<'a> {
    pub fn new(
        client: &'a GithubClient,
        org: &'a str,
        repo: &'a str,
        secrets: &'a Secrets,
    ) -> Self {
        Self {
            client,
            org,
            repo,
            secrets,
        }
    }

    pub async fn verify(&self, fix: bool) -> Result<(), KeeperError> {
        let handler = self.problem_handler(fix);
        let template = self.issues_hook_template()?;
        let hooks = self.client.hooks(self.org, self.repo).await?;
        match find_hook_by_url(&hooks, template.config.url.as_deref().unwrap_or_default()) {
            None => handler.create_hook(&template).await?,
            Some(hook) => {
                if !hook_matches_template(hook, &template) {
                    handler.update_hook(hook, &template).await?;
                }
            }
        }
        Ok(())
    }

    fn problem_handler(&self, fix: bool) -> Box<dyn WebHookProblemHandler + 'a> {
        if fix {
            Box::new(FixWebHookProblemHandler {
                client: self.client,
                org: self.org,
                repo: self.repo,
            })
        } else {
            Box::new(LogWebHookProblemHandler { repo: self.repo })
        }
    }

    fn issues_hook_template(&self) -> Result<HookRequest, ConfigError> {
        let url = self.secrets.resolve(SLACK_WEBHOOK_SECRET)?;
        Ok(HookRequest {
            name: "web".to_string(),
            active: true,
            events: [
                "release",
                "issues",
                "repository_vulnerability_alert",
                "secret_scanning_alert",
                "repository",
            ]
            .iter()
            .map(|event| event.to_string())
            .collect(),
            config: HookConfig {
                url: Some(url.to_string()),
                content_type: Some("form".to_string()),
            },
        })
    }
}

fn find_hook_by_url<'h>(hooks: &'h [Hook], url: &str) -> Option<&'h Hook> {
    hooks
        .iter()
        .find(|hook| hook.config.url.as_deref() == Some(url))
}

fn hook_matches_template(hook: &Hook, template: &HookRequest) -> bool {
    hook.active == template.active
        && hook.config.url == template.config.url
        && hook.config.content_type == template.config.content_type
        && strings_equal_ignoring_order(&hook.events, &template.events)
}
