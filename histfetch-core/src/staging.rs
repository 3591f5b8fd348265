//! Staging directory guard.
//!
//! Runs once before a download starts. An existing directory is reused,
//! anything else at that path is fatal, and a missing directory is only
//! created after the operator agrees.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("configuration error: '{0}' exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("aborted: staging directory '{0}' is required")]
    Declined(PathBuf),

    #[error("could not create staging directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Yes/no decision source for interactive prompts.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Make sure `dir` exists as a directory, asking before creating it.
pub fn ensure_staging_dir(dir: &Path, confirm: &dyn Confirm) -> Result<PathBuf, StagingError> {
    if dir.exists() {
        if dir.is_dir() {
            return Ok(dir.to_path_buf());
        }
        return Err(StagingError::NotADirectory(dir.to_path_buf()));
    }

    let prompt = format!("Create temporary directory '{}'?", dir.display());
    if !confirm.confirm(&prompt) {
        return Err(StagingError::Declined(dir.to_path_buf()));
    }

    std::fs::create_dir_all(dir)?;
    info!("Created {}", dir.display());
    Ok(dir.to_path_buf())
}
