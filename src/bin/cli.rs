use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use repo_keeper::keeper::checks;
use repo_keeper::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "repo-keeper")]
#[command(about = "Audit and repair GitHub repository configuration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitHub organization owning the repositories (defaults to the
    /// config file's `organization`)
    #[arg(short, long, global = true)]
    org: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify branch protection and labels for the given repositories
    ConfigureRepo {
        #[arg(value_name = "REPO", required = true)]
        repos: Vec<String>,

        /// Apply the findings instead of only printing them
        #[arg(long)]
        fix: bool,
    },

    /// Set up branch protection for the given repositories
    CreateBranchProtection {
        #[arg(value_name = "REPO", required = true)]
        repos: Vec<String>,

        /// Apply the findings instead of only printing them
        #[arg(long)]
        fix: bool,
    },

    /// Unify the GitHub labels of the given repositories
    UnifyLabels {
        #[arg(value_name = "REPO", required = true)]
        repos: Vec<String>,

        /// Apply the findings instead of only printing them
        #[arg(long)]
        fix: bool,
    },

    /// Verify the issue webhooks of the given repositories
    CheckWebhooks {
        #[arg(value_name = "REPO", required = true)]
        repos: Vec<String>,

        /// Secrets file holding the webhook target URL
        #[arg(long, value_name = "FILE")]
        secrets: PathBuf,

        /// Apply the findings instead of only printing them
        #[arg(long)]
        fix: bool,
    },

    /// Verify the repository settings of the given repositories
    RepoSettings {
        #[arg(value_name = "REPO", required = true)]
        repos: Vec<String>,

        /// Apply the findings instead of only printing them
        #[arg(long)]
        fix: bool,
    },

    /// Reactivate scheduled GitHub Actions workflows that GitHub disabled
    ReactivateScheduledActions {
        #[arg(value_name = "REPO", required = true)]
        repos: Vec<String>,
    },

    /// List organization repositories where you have admin access
    ListMyRepos,

    /// Parse local workflow files and print the derived required checks
    LintWorkflows {
        /// Directory holding the workflow YAML files
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // The lint command is fully offline; everything else needs a client.
    if let Commands::LintWorkflows { dir } = &cli.command {
        return lint_workflows(dir);
    }

    let config = KeeperConfig::load()?;
    let org = cli
        .org
        .or_else(|| config.organization.clone())
        .context("no organization given: pass --org or set 'organization' in the config file")?;
    let client = GithubClient::new(&config.github_token()?)?;

    match cli.command {
        Commands::ConfigureRepo { repos, fix } => {
            for repo in &repos {
                println!("\n{repo}");
                BranchProtectionVerifier::new(&client, &org, repo)
                    .verify(fix)
                    .await?;
                unify_labels(&client, &org, repo, fix).await?;
            }
        }
        Commands::CreateBranchProtection { repos, fix } => {
            for repo in &repos {
                BranchProtectionVerifier::new(&client, &org, repo)
                    .verify(fix)
                    .await?;
            }
        }
        Commands::UnifyLabels { repos, fix } => {
            for repo in &repos {
                println!("\n{repo}");
                unify_labels(&client, &org, repo, fix).await?;
            }
        }
        Commands::CheckWebhooks { repos, secrets, fix } => {
            let secrets = Secrets::from_file(&secrets)?;
            for repo in &repos {
                WebHookVerifier::new(&client, &org, repo, &secrets)
                    .verify(fix)
                    .await?;
            }
        }
        Commands::RepoSettings { repos, fix } => {
            for repo in &repos {
                RepoSettingsVerifier::new(&client, &org, repo)
                    .verify(fix)
                    .await?;
            }
        }
        Commands::ReactivateScheduledActions { repos } => {
            for repo in &repos {
                reactivate_workflows(&client, &org, repo).await?;
            }
        }
        Commands::ListMyRepos => {
            let repositories = client.org_repositories(&org).await?;
            for repository in repositories {
                if repository.permissions.get("admin").copied().unwrap_or(false) {
                    println!("{}", repository.name);
                }
            }
        }
        Commands::LintWorkflows { .. } => unreachable!("handled above"),
    }
    Ok(())
}

/// Offline audit: parse every workflow file in `dir` and print the checks a
/// branch protection rule would require. Validation errors abort with the
/// operator-facing message; other unsupported files are reported and
/// skipped, like the online audit does.
fn lint_workflows(dir: &Path) -> anyhow::Result<()> {
    let files = WorkflowLoader::read_directory(dir)?;
    if files.is_empty() {
        println!("No workflow files found in {}", dir.display());
        return Ok(());
    }
    for (path, content) in &files {
        match checks::checks_for_workflow_content(content) {
            Ok(names) if names.is_empty() => {
                println!("{path}: no push/pull_request trigger, contributes no checks");
            }
            Ok(names) => {
                println!("{path}:");
                for name in names {
                    println!("  {name}");
                }
            }
            Err(error) if error.is_validation() => {
                return Err(anyhow::Error::from(error)
                    .context(format!("validation failed for {path}")));
            }
            Err(error) => {
                println!("{path}: skipped ({error})");
            }
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
