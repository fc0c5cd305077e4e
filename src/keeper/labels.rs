//! Label audit
//!
//! Enforces the canonical label set: removes labels that are not part of
//! it, renames labels that match a historical name, creates missing
//! required labels and repairs colors.

use async_trait::async_trait;
use tracing::info;

use super::KeeperError;
use crate::github::{GithubClient, Label, LabelRequest};

pub struct LabelDefinition {
    pub name: &'static str,
    pub color: &'static str,
    pub old_names: &'static [&'static str],
    pub required: bool,
}

/// The canonical label set for all repositories of the organization.
pub const LABEL_DEFINITIONS: &[LabelDefinition] = &[
    LabelDefinition { name: "feature", color: "88ee66", old_names: &["enhancement"], required: true },
    LabelDefinition { name: "bug", color: "ee0000", old_names: &[], required: true },
    LabelDefinition { name: "documentation", color: "0000ee", old_names: &[], required: true },
    LabelDefinition { name: "refactoring", color: "ffbb11", old_names: &[], required: true },
    LabelDefinition { name: "duplicate", color: "cccccc", old_names: &[], required: true },
    LabelDefinition { name: "invalid", color: "eeeeee", old_names: &[], required: true },
    LabelDefinition { name: "question", color: "cc3377", old_names: &["help wanted"], required: true },
    LabelDefinition { name: "ci", color: "cc3377", old_names: &[], required: false },
    LabelDefinition { name: "source:internal", color: "eeeeee", old_names: &[], required: true },
    LabelDefinition { name: "source:external", color: "eeeeee", old_names: &[], required: true },
    LabelDefinition { name: "decision:wont-fix", color: "ffffff", old_names: &["wontfix", "won't fix", "status:wont-fix"], required: true },
    LabelDefinition { name: "shelved:yes", color: "ff33cc", old_names: &[], required: true },
    LabelDefinition { name: "timeline:long-term", color: "555555", old_names: &["long-term", "timeline:longterm"], required: true },
    LabelDefinition { name: "complexity:low", color: "4FC24F", old_names: &["good-first-issue"], required: true },
    LabelDefinition { name: "complexity:medium", color: "F2BF63", old_names: &[], required: true },
    LabelDefinition { name: "complexity:high", color: "F26363", old_names: &[], required: true },
    LabelDefinition { name: "dependencies", color: "ffbb11", old_names: &[], required: false },
    LabelDefinition { name: "security", color: "ee0000", old_names: &[], required: false },
    LabelDefinition { name: "blocked:yes", color: "000000", old_names: &["blocked", "status:blocked"], required: true },
];

#[async_trait]
trait LabelProblemHandler: Send + Sync {
    async fn create_label(&self, definition: &LabelDefinition) -> Result<(), KeeperError>;
    async fn remove_label(&self, label: &Label) -> Result<(), KeeperError>;
    async fn rename_label(
        &self,
        label: &Label,
        definition: &LabelDefinition,
    ) -> Result<(), KeeperError>;
    async fn set_color(
        &self,
        label: &Label,
        definition: &LabelDefinition,
    ) -> Result<(), KeeperError>;
}

struct DryRunLabelHandler;

#[async_trait]
impl LabelProblemHandler for DryRunLabelHandler {
    async fn create_label(&self, definition: &LabelDefinition) -> Result<(), KeeperError> {
        println!("Missing required label '{}'. Would create.", definition.name);
        Ok(())
    }

    async fn remove_label(&self, label: &Label) -> Result<(), KeeperError> {
        println!("Superfluous label '{}'. Would remove.", label.name);
        Ok(())
    }

    async fn rename_label(
        &self,
        label: &Label,
        definition: &LabelDefinition,
    ) -> Result<(), KeeperError> {
        println!(
            "The label '{}' was renamed to '{}'. Would rename.",
            label.name, definition.name
        );
        Ok(())
    }

    async fn set_color(
        &self,
        label: &Label,
        definition: &LabelDefinition,
    ) -> Result<(), KeeperError> {
        println!(
            "Label '{}' has wrong color {}. Expected: {}. Would change.",
            label.name, label.color, definition.color
        );
        Ok(())
    }
}

struct FixingLabelHandler<'a> {
    client: &'a GithubClient,
    org: &'a str,
    repo: &'a str,
}

impl FixingLabelHandler<'_> {
    async fn update(
        &self,
        old_name: &str,
        definition: &LabelDefinition,
    ) -> Result<(), KeeperError> {
        let request = LabelRequest {
            name: definition.name.to_string(),
            color: definition.color.to_string(),
        };
        self.client
            .update_label(self.org, self.repo, old_name, &request)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl LabelProblemHandler for FixingLabelHandler<'_> {
    async fn create_label(&self, definition: &LabelDefinition) -> Result<(), KeeperError> {
        let request = LabelRequest {
            name: definition.name.to_string(),
            color: definition.color.to_string(),
        };
        self.client
            .create_label(self.org, self.repo, &request)
            .await?;
        info!(label = definition.name, "created label");
        Ok(())
    }

    async fn remove_label(&self, label: &Label) -> Result<(), KeeperError> {
        self.client
            .delete_label(self.org, self.repo, &label.name)
            .await?;
        info!(label = %label.name, "removed label");
        Ok(())
    }

    async fn rename_label(
        &self,
        label: &Label,
        definition: &LabelDefinition,
    ) -> Result<(), KeeperError> {
        self.update(&label.name, definition).await
    }

    async fn set_color(
        &self,
        label: &Label,
        definition: &LabelDefinition,
    ) -> Result<(), KeeperError> {
        self.update(&label.name, definition).await
    }
}

pub async fn unify_labels(
    client: &GithubClient,
    org: &str,
    repo: &str,
    fix: bool,
) -> Result<(), KeeperError> {
    let handler: Box<dyn LabelProblemHandler> = if fix {
        Box::new(FixingLabelHandler { client, org, repo })
    } else {
        Box::new(DryRunLabelHandler)
    };

    let labels = client.labels(org, repo).await?;
    for label in &labels {
        if find_definition_by_name(&label.name).is_none() {
            match find_definition_by_old_name(&label.name) {
                Some(definition) => handler.rename_label(label, definition).await?,
                None => handler.remove_label(label).await?,
            }
        }
    }

    // List again to pick up renames before filling the gaps.
    let labels = client.labels(org, repo).await?;
    for definition in LABEL_DEFINITIONS {
        match labels.iter().find(|label| label.name == definition.name) {
            None => {
                if definition.required {
                    handler.create_label(definition).await?;
                }
            }
            Some(label) => {
                if label.color != definition.color {
                    handler.set_color(label, definition).await?;
                }
            }
        }
    }
    Ok(())
}

fn find_definition_by_name(name: &str) -> Option<&'static LabelDefinition> {
    LABEL_DEFINITIONS
        .iter()
        .find(|definition| definition.name == name)
}

fn find_definition_by_old_name(name: &str) -> Option<&'static LabelDefinition> {
    LABEL_DEFINITIONS
        .iter()
        .find(|definition| definition.old_names.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_definition_by_name() {
        assert_eq!(find_definition_by_name("bug").map(|d| d.color), Some("ee0000"));
        assert!(find_definition_by_name("unknown").is_none());
    }

    #[test]
    fn test_find_definition_by_old_name() {
        assert_eq!(
            find_definition_by_old_name("enhancement").map(|d| d.name),
            Some("feature")
        );
        assert_eq!(
            find_definition_by_old_name("status:blocked").map(|d| d.name),
            Some("blocked:yes")
        );
        assert!(find_definition_by_old_name("bug").is_none());
    }
}
