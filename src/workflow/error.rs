//! Workflow parser error types
//!
//! Callers branch on exactly one structural property of an error:
//! [`WorkflowError::is_validation`]. Validation errors mean the operator has
//! to change the workflow file itself and the whole audit run must stop,
//! because an incomplete required-checks list would silently weaken branch
//! protection. Every other error marks a single file as unsupported; callers
//! log a warning and move on to the next file.

/// Hard failures raised during job-name expansion. The expanded check list
/// would be wrong or incomplete without operator action, so these abort the
/// whole run. The message text is surfaced verbatim to users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("multi dimensional matrix jobs with no explicit name are not supported. Please add a name field to the job that combines the matrix parameters into a more readable name. For example \"Build with Go ${{{{ matrix.go }}}} and database ${{{{ matrix.db }}}}\"")]
    MultiDimensionalMatrixWithoutName,

    #[error("matrix jobs with object parameters and no job name are not supported. Please add a name field to the job that combines the matrix parameters into a more readable name. For example \"Build with Go ${{{{ matrix.go }}}} and database ${{{{ matrix.db }}}}\"")]
    ObjectParametersWithoutName,
}

/// Errors that can occur while parsing a workflow definition or expanding
/// its job names.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid workflow YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("the workflow '{workflow}' has an unsupported trigger definition style")]
    UnsupportedTriggerStyle { workflow: String },

    #[error("the build matrix of job '{job}' is not supported: {reason}")]
    UnsupportedMatrix { job: String, reason: String },
}

impl WorkflowError {
    /// True for errors that must abort a whole audit run. All other errors
    /// mean "skip this one file with a warning".
    pub fn is_validation(&self) -> bool {
        matches!(self, WorkflowError::Validation(_))
    }

    pub(crate) fn unsupported_matrix(job: &str, reason: impl Into<String>) -> Self {
        WorkflowError::UnsupportedMatrix {
            job: job.to_string(),
            reason: reason.into(),
        }
    }
}
