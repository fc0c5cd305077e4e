//! Required status check collection
//!
//! Turns a set of workflow files into the union of their expanded job
//! names. Only workflows triggered by push or pull_request contribute;
//! their job names are what branch protection must require.
//!
//! Error policy: a validation error (ambiguous job naming) aborts the whole
//! collection, because continuing would produce an incomplete check list
//! that looks complete. Any other parse error only skips the offending file
//! with a warning.

use std::collections::BTreeSet;

use tracing::warn;

use crate::workflow::{WorkflowDefinition, WorkflowError};

/// Outcome of a collection pass over a set of workflow files.
#[derive(Debug, Clone, Default)]
pub struct RequiredChecks {
    pub checks: BTreeSet<String>,
    /// Files skipped because of unsupported (but non-fatal) syntax, with
    /// the reason.
    pub skipped: Vec<(String, String)>,
}

/// Collect required checks from `(path, content)` pairs.
pub fn collect_required_checks<I>(files: I) -> Result<RequiredChecks, WorkflowError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut collected = RequiredChecks::default();
    for (path, content) in files {
        match checks_for_workflow_content(&content) {
            Ok(names) => collected.checks.extend(names),
            Err(error) if error.is_validation() => return Err(error),
            Err(error) => {
                warn!(file = %path, %error, "skipping workflow with unsupported syntax");
                collected.skipped.push((path, error.to_string()));
            }
        }
    }
    Ok(collected)
}

/// Checks contributed by a single workflow document: its expanded job names
/// when it triggers on push or pull_request, nothing otherwise.
pub fn checks_for_workflow_content(content: &str) -> Result<BTreeSet<String>, WorkflowError> {
    let definition = WorkflowDefinition::parse(content)?;
    if definition.trigger().triggers_on_push_or_pull_request() {
        definition.job_names()
    } else {
        Ok(BTreeSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUSH_WORKFLOW: &str = "\
name: CI Build
on:
  push:
jobs:
  build:
    runs-on: ubuntu-latest
";

    const SCHEDULED_WORKFLOW: &str = "\
name: Nightly
on:
  schedule:
    - cron: '0 3 * * *'
jobs:
  nightly:
    runs-on: ubuntu-latest
";

    const DYNAMIC_MATRIX_WORKFLOW: &str = "\
name: Dynamic
on:
  push:
jobs:
  test:
    strategy:
      matrix:
        test-path: ${{fromJson(needs.prep.outputs.matrix)}}
";

    const UNNAMED_MULTI_DIM_WORKFLOW: &str = "\
name: Broken
on:
  push:
jobs:
  build:
    strategy:
      matrix:
        a: [1, 2]
        b: ['3']
";

    fn file(name: &str, content: &str) -> (String, String) {
        (name.to_string(), content.to_string())
    }

    #[test]
    fn test_push_workflow_contributes_job_names() {
        let collected =
            collect_required_checks([file("ci.yaml", PUSH_WORKFLOW)]).unwrap();
        assert_eq!(collected.checks, BTreeSet::from(["build".to_string()]));
        assert!(collected.skipped.is_empty());
    }

    #[test]
    fn test_scheduled_workflow_contributes_nothing() {
        let collected =
            collect_required_checks([file("nightly.yaml", SCHEDULED_WORKFLOW)]).unwrap();
        assert!(collected.checks.is_empty());
    }

    #[test]
    fn test_unsupported_syntax_skips_only_that_file() {
        let collected = collect_required_checks([
            file("dynamic.yaml", DYNAMIC_MATRIX_WORKFLOW),
            file("ci.yaml", PUSH_WORKFLOW),
        ])
        .unwrap();
        assert_eq!(collected.checks, BTreeSet::from(["build".to_string()]));
        assert_eq!(collected.skipped.len(), 1);
        assert_eq!(collected.skipped[0].0, "dynamic.yaml");
    }

    #[test]
    fn test_validation_error_aborts_the_collection() {
        let error = collect_required_checks([
            file("broken.yaml", UNNAMED_MULTI_DIM_WORKFLOW),
            file("ci.yaml", PUSH_WORKFLOW),
        ])
        .unwrap_err();
        assert!(error.is_validation());
    }

    #[test]
    fn test_matrix_problems_in_non_push_workflows_are_ignored() {
        // The ambiguous matrix never gets expanded because the workflow is
        // not push/pull_request triggered.
        let content = UNNAMED_MULTI_DIM_WORKFLOW.replace("push:", "workflow_dispatch:");
        let collected = collect_required_checks([file("other.yaml", &content)]).unwrap();
        assert!(collected.checks.is_empty());
        assert!(collected.skipped.is_empty());
    }
}
