//! Workflow file loader
//!
//! Read workflow YAML files from a local checkout, for audits that run
//! without network access.

use std::path::Path;

use super::definition::WorkflowDefinition;
use super::error::WorkflowError;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {file}: {error}")]
    Parse {
        file: String,
        #[source]
        error: WorkflowError,
    },
}

pub struct WorkflowLoader;

impl WorkflowLoader {
    /// Read every `*.yaml`/`*.yml` file in `dir`, returning display path and
    /// raw content, sorted by file name. Parsing is left to the caller so it
    /// can apply its own skip-or-abort policy per file.
    pub fn read_directory(dir: &Path) -> Result<Vec<(String, String)>, LoadError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|ext| ext.to_str());
            if ext == Some("yaml") || ext == Some("yml") {
                let content = std::fs::read_to_string(&path)?;
                files.push((path.display().to_string(), content));
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn load_file(path: &Path) -> Result<WorkflowDefinition, LoadError> {
        let content = std::fs::read_to_string(path)?;
        WorkflowDefinition::parse(&content).map_err(|error| LoadError::Parse {
            file: path.display().to_string(),
            error,
        })
    }
}
