//! Workflow-definition parsing
//!
//! This module turns one GitHub Actions workflow YAML document into the two
//! facts the audits need: a normalized trigger classification and the
//! expanded set of concrete job names (the required status checks):
//! - `definition` - document decoding and `WorkflowDefinition`
//! - `trigger` - `on:` normalization for list- and map-style syntax
//! - `matrix` - build-matrix decoding, stringification and name expansion
//! - `error` - the two-tier (fatal vs. skip-this-file) error taxonomy
//! - `loader` - read workflow files from a local checkout

pub mod definition;
pub mod error;
pub mod loader;
pub mod matrix;
pub mod trigger;

// Re-export all public types for convenience
pub use definition::{JobDescription, WorkflowDefinition};
pub use error::{ValidationError, WorkflowError};
pub use loader::{LoadError, WorkflowLoader};
pub use matrix::{MatrixValue, ScalarValue};
pub use trigger::TriggerClassification;
