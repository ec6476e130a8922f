//! Removal of the BAR build workspace.
//!
//! Flows left under the workspace break later toolkit builds, since their path
//! decides their namespace. The workspace is retained by default so it can be
//! inspected after a failed packaging run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

#[derive(Debug)]
pub enum CleanOutcome {
    Retained,
    Cleaned,
    NotPresent,
    DeleteFailed { path: PathBuf, error: io::Error },
}

impl CleanOutcome {
    pub fn is_warning(&self) -> bool {
        matches!(self, CleanOutcome::DeleteFailed { .. })
    }
}

/// Deletes `workspace` unless `retain` is set. Never fails the build: a
/// deletion error comes back as [`CleanOutcome::DeleteFailed`].
pub fn clean(workspace: &Path, retain: bool) -> CleanOutcome {
    if retain {
        info!(workspace = %workspace.display(), "Workspace retained, not cleaning");
        return CleanOutcome::Retained;
    }

    if !workspace.exists() {
        info!(workspace = %workspace.display(), "Workspace does not exist, nothing to clean");
        return CleanOutcome::NotPresent;
    }

    info!(workspace = %workspace.display(), "Cleaning up the workspace directory");
    match fs::remove_dir_all(workspace) {
        Ok(()) => CleanOutcome::Cleaned,
        Err(error) => {
            warn!(error = ?error, workspace = %workspace.display(), "Failed to delete workspace");
            CleanOutcome::DeleteFailed {
                path: workspace.to_path_buf(),
                error,
            }
        }
    }
}
