//! Scheduled workflow reactivation
//!
//! GitHub disables scheduled workflow runs after a period without repo
//! activity. This audit re-enables every workflow that is not active.

use tracing::info;

use super::KeeperError;
use crate::github::GithubClient;

pub async fn reactivate_workflows(
    client: &GithubClient,
    org: &str,
    repo: &str,
) -> Result<(), KeeperError> {
    let workflows = client.actions_workflows(org, repo).await?;
    for workflow in workflows {
        if workflow.state != "active" {
            println!("Reactivating {}/{}", repo, workflow.name);
            client.enable_workflow(org, repo, workflow.id).await?;
            info!(repo, workflow = %workflow.name, "reactivated workflow");
        }
    }
    Ok(())
}
