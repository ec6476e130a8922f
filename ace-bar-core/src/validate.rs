//! Project identity validation.
//!
//! A toolkit project is only packaged when three names agree: the directory it
//! lives in, the name its `.project` declares, and the artifact id the build
//! assigns it. The toolkit derives flow namespaces from paths, so a mismatch
//! produces a BAR that deploys under the wrong name.

use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::{error, info};

use crate::descriptor::{self, DescriptorError, ProjectKind};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("could not read project descriptor: {0}")]
    DescriptorRead(#[from] DescriptorError),

    #[error(
        "The Project Directory Name ('{directory}') is not the same as the Project Name (in .project file) ('{declared}')"
    )]
    NameMismatch { directory: String, declared: String },

    #[error(
        "Project Directory Name ('{directory}') is not the same as the Maven artifactId (in pom.xml) ('{identifier}')"
    )]
    IdentifierMismatch {
        directory: String,
        identifier: String,
    },
}

/// The agreed identity of a validated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    pub directory_name: String,
    pub declared_name: String,
    pub identifier: String,
    pub kind: ProjectKind,
}

/// Checks that the directory name of `project_directory` equals both the name
/// declared in its `.project` file and `artifact_id`.
pub fn validate(
    project_directory: &Path,
    artifact_id: &str,
) -> Result<ProjectIdentity, ValidationError> {
    let directory = directory_name(project_directory)?;
    let project = descriptor::read_project_descriptor(project_directory)?;

    if directory != project.name {
        error!(directory = %directory, declared = %project.name, "Project name mismatch");
        return Err(ValidationError::NameMismatch {
            directory,
            declared: project.name,
        });
    }

    if directory != artifact_id {
        error!(directory = %directory, identifier = %artifact_id, "Artifact id mismatch");
        return Err(ValidationError::IdentifierMismatch {
            directory,
            identifier: artifact_id.to_string(),
        });
    }

    info!(project = %directory, kind = ?project.kind(), "Project identity validated");
    Ok(ProjectIdentity {
        kind: project.kind(),
        declared_name: project.name,
        identifier: artifact_id.to_string(),
        directory_name: directory,
    })
}

/// Like [`validate`], taking the artifact id from the project's own `pom.xml`.
pub fn validate_project_dir(project_directory: &Path) -> Result<ProjectIdentity, ValidationError> {
    let pom = descriptor::read_pom_descriptor(project_directory)?;
    validate(project_directory, &pom.artifact_id)
}

fn directory_name(project_directory: &Path) -> Result<String, ValidationError> {
    let unreadable = |source: io::Error| DescriptorError::Io {
        path: project_directory.to_path_buf(),
        source,
    };
    // `.` and trailing `..` carry no name of their own.
    let resolved = if project_directory.file_name().is_none() {
        project_directory.canonicalize().map_err(unreadable)?
    } else {
        project_directory.to_path_buf()
    };
    match resolved.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => Err(unreadable(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path has no final segment to name the project",
        ))
        .into()),
    }
}
