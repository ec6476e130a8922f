//! Preparation of the BAR build workspace.
//!
//! Creates the workspace, hands the matching dependency archives to an
//! [`ArchiveUnpacker`], then removes the unpacker's marker directory. Only the
//! first two steps can fail the build; marker cleanup is best effort and its
//! failure is carried back as a warning in [`PrepareOutcome`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::contract::{ArchiveUnpacker, DependencyArchive, UnpackError, UnpackReport, UnpackRequest};
use crate::filter::DependencyFilter;

/// Inputs of one preparation run.
#[derive(Debug, Clone)]
pub struct PrepareConfig {
    pub workspace: PathBuf,
    pub markers_directory: PathBuf,
    pub filter: DependencyFilter,
}

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("failed to create workspace {}: {source}", path.display())]
    CreateWorkspace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unpacking dependencies failed: {0}")]
    UnpackFailed(#[from] UnpackError),
}

/// What happened to the marker directory after unpacking.
#[derive(Debug)]
pub enum MarkerCleanup {
    Removed,
    NotPresent,
    Failed { path: PathBuf, error: io::Error },
}

#[derive(Debug)]
pub struct PrepareOutcome {
    pub report: UnpackReport,
    pub marker_cleanup: MarkerCleanup,
}

impl PrepareOutcome {
    /// Non-fatal problems worth surfacing to the user.
    pub fn warnings(&self) -> Vec<String> {
        match &self.marker_cleanup {
            MarkerCleanup::Failed { path, error } => vec![format!(
                "could not delete marker directory {}: {error}",
                path.display()
            )],
            _ => Vec::new(),
        }
    }
}

pub fn prepare(
    config: &PrepareConfig,
    dependencies: &[DependencyArchive],
    unpacker: &dyn ArchiveUnpacker,
) -> Result<PrepareOutcome, PrepareError> {
    info!(workspace = %config.workspace.display(), "Preparing BAR build workspace");

    fs::create_dir_all(&config.workspace).map_err(|source| {
        error!(error = ?source, path = %config.workspace.display(), "Failed to create workspace");
        PrepareError::CreateWorkspace {
            path: config.workspace.clone(),
            source,
        }
    })?;

    let request = UnpackRequest {
        output_directory: config.workspace.clone(),
        archives: config.filter.select(dependencies),
        filter: config.filter.clone(),
    };
    debug!(
        declared = dependencies.len(),
        selected = request.archives.len(),
        "Selected dependency archives"
    );

    let report = unpacker.unpack(&request).map_err(|e| {
        error!(error = %e, "Unpacking dependency archives failed");
        PrepareError::UnpackFailed(e)
    })?;
    info!(
        unpacked = report.unpacked.len(),
        skipped = report.skipped.len(),
        "Dependency archives unpacked"
    );

    let marker_cleanup = remove_markers(&config.markers_directory);

    Ok(PrepareOutcome {
        report,
        marker_cleanup,
    })
}

fn remove_markers(path: &Path) -> MarkerCleanup {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed marker directory");
            MarkerCleanup::Removed
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => MarkerCleanup::NotPresent,
        Err(e) => {
            warn!(error = ?e, path = %path.display(), "Failed to remove marker directory, continuing");
            MarkerCleanup::Failed {
                path: path.to_path_buf(),
                error: e,
            }
        }
    }
}
