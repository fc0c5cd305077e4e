//! Trigger classification
//!
//! GitHub Actions allows two syntaxes for the `on:` field: a plain list of
//! trigger names and a mapping from trigger name to trigger parameters. Both
//! are normalized here into a [`TriggerClassification`]. Only `push` and
//! `pull_request` carry meaning for branch protection; every other trigger
//! kind (`schedule`, `workflow_dispatch`, ...) is consumed without effect.

use std::collections::BTreeSet;

use serde_yaml::Value;

use super::error::WorkflowError;

/// Normalized view of a workflow's triggers.
///
/// For a `push` trigger exactly one of `on_push_to_any_branch` and a
/// non-empty `on_push_to_branches` is meaningful: a `branches:` filter fills
/// the set and leaves the flag false, an unfiltered `push` sets the flag and
/// leaves the set empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerClassification {
    pub on_pull_request: bool,
    pub on_push_to_any_branch: bool,
    pub on_push_to_branches: BTreeSet<String>,
}

impl TriggerClassification {
    /// Whether job names of this workflow become required status checks.
    pub fn triggers_on_push_or_pull_request(&self) -> bool {
        self.on_pull_request || self.on_push_to_any_branch || !self.on_push_to_branches.is_empty()
    }

    pub(crate) fn classify(raw: &Value, workflow: &str) -> Result<Self, WorkflowError> {
        match raw {
            Value::Sequence(entries) => Ok(Self::from_list(entries)),
            Value::Mapping(map) => Ok(Self::from_map(map)),
            _ => Err(WorkflowError::UnsupportedTriggerStyle {
                workflow: workflow.to_string(),
            }),
        }
    }

    /// List syntax: `on: [push, pull_request]`. Unrecognized entries are
    /// ignored.
    fn from_list(entries: &[Value]) -> Self {
        let mut classification = Self::default();
        for entry in entries {
            match entry.as_str() {
                Some(name) if name.eq_ignore_ascii_case("push") => {
                    classification.on_push_to_any_branch = true;
                }
                Some(name) if name.eq_ignore_ascii_case("pull_request") => {
                    classification.on_pull_request = true;
                }
                _ => {}
            }
        }
        classification
    }

    /// Map syntax: `on: { push: {...}, pull_request: {...} }`.
    fn from_map(map: &serde_yaml::Mapping) -> Self {
        let mut classification = Self::default();
        for (key, params) in map {
            let Some(name) = key.as_str() else { continue };
            if name.eq_ignore_ascii_case("pull_request") {
                classification.on_pull_request = true;
            } else if name.eq_ignore_ascii_case("push") {
                classification.classify_push(params);
            }
        }
        classification
    }

    fn classify_push(&mut self, params: &Value) {
        let branches: Vec<String> = params
            .get("branches")
            .and_then(Value::as_sequence)
            .map(|filter| {
                filter
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        if branches.is_empty() {
            // A push trigger without an effective branches filter runs on
            // every branch.
            self.on_push_to_any_branch = true;
        } else {
            self.on_push_to_branches.extend(branches);
        }
    }
}
