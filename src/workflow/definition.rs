//! Workflow document parsing
//!
//! Deserializes one GitHub Actions workflow YAML document into an immutable
//! [`WorkflowDefinition`]. The `on:` field has no fixed shape and is decoded
//! as a raw value, then normalized by the trigger classifier. The job table
//! keeps each job's `strategy.matrix` raw: matrix expansion is deferred to
//! [`WorkflowDefinition::job_names`], so trigger classification succeeds
//! even for workflows whose matrices cannot be expanded.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use super::error::WorkflowError;
use super::matrix;
use super::trigger::TriggerClassification;

#[derive(Debug, Deserialize)]
struct RawWorkflow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    on: Option<serde_yaml::Value>,
    #[serde(default)]
    jobs: BTreeMap<String, RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    strategy: Option<RawStrategy>,
}

#[derive(Debug, Deserialize)]
struct RawStrategy {
    #[serde(default)]
    matrix: Option<serde_yaml::Value>,
}

/// One job of a workflow: the optional explicit display name and the raw
/// build matrix, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    explicit_name: Option<String>,
    matrix: Option<serde_yaml::Value>,
}

/// A parsed workflow document.
///
/// Immutable once parsed; parsing the same text twice yields equal values.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDefinition {
    name: String,
    trigger: TriggerClassification,
    jobs: BTreeMap<String, JobDescription>,
}

impl WorkflowDefinition {
    /// Parse one workflow document.
    ///
    /// Fails on invalid YAML and on an unsupported trigger shape, never on
    /// matrix problems; those surface from [`Self::job_names`].
    pub fn parse(content: &str) -> Result<Self, WorkflowError> {
        let raw: RawWorkflow = serde_yaml::from_str(content)?;
        let name = raw.name.unwrap_or_default();
        let on = raw.on.unwrap_or(serde_yaml::Value::Null);
        let trigger = TriggerClassification::classify(&on, &name)?;
        let jobs = raw
            .jobs
            .into_iter()
            .map(|(key, job)| {
                let description = JobDescription {
                    explicit_name: job.name,
                    matrix: job.strategy.and_then(|strategy| strategy.matrix),
                };
                (key, description)
            })
            .collect();
        Ok(Self {
            name,
            trigger,
            jobs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> &TriggerClassification {
        &self.trigger
    }

    /// Expand every job into its concrete display names and union the
    /// results. Duplicates collapse; order carries no meaning. The first
    /// expansion error is propagated with its classification intact.
    pub fn job_names(&self) -> Result<BTreeSet<String>, WorkflowError> {
        let mut names = BTreeSet::new();
        for (key, job) in &self.jobs {
            names.extend(matrix::expand_job_names(
                key,
                job.explicit_name.as_deref(),
                job.matrix.as_ref(),
            )?);
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_captures_name_and_trigger() {
        let definition = WorkflowDefinition::parse(
            "name: CI Build\non:\n  - push\njobs:\n  build:\n    runs-on: ubuntu-latest\n",
        )
        .unwrap();
        assert_eq!(definition.name(), "CI Build");
        assert!(definition.trigger().on_push_to_any_branch);
        assert_eq!(
            definition.job_names().unwrap(),
            BTreeSet::from(["build".to_string()])
        );
    }

    #[test]
    fn test_missing_trigger_is_unsupported() {
        let error = WorkflowDefinition::parse("name: CI\njobs: {}\n").unwrap_err();
        assert!(matches!(
            error,
            WorkflowError::UnsupportedTriggerStyle { .. }
        ));
    }

    #[test]
    fn test_matrix_problems_do_not_fail_parsing() {
        let definition = WorkflowDefinition::parse(
            "on:\n  push:\njobs:\n  build:\n    strategy:\n      matrix:\n        path: ${{fromJson(needs.prep.outputs.matrix)}}\n",
        )
        .unwrap();
        let error = definition.job_names().unwrap_err();
        assert!(!error.is_validation());
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let content = "name: CI\non:\n  push:\n    branches: [main]\njobs:\n  build:\n    strategy:\n      matrix:\n        a: [1, 2]\n";
        let first = WorkflowDefinition::parse(content).unwrap();
        let second = WorkflowDefinition::parse(content).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.job_names().unwrap(), second.job_names().unwrap());
    }
}
