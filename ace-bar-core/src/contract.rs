//! # contract: shared data model and the delegated unpack interface
//!
//! This module defines the plain data types every step of the BAR workspace
//! pipeline exchanges, and the single trait ([`ArchiveUnpacker`]) through which
//! the preparer delegates extraction of dependency archives.
//!
//! ## Interface & Extensibility
//! - Implement [`ArchiveUnpacker`] to plug in a new extraction strategy
//!   (local repository, shelling out to a build tool, a test double).
//! - The preparer only guarantees it calls `unpack` once, with the target
//!   directory and the already-filtered archives; everything else belongs to the
//!   implementor.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so consumers can generate
//!   deterministic mocks in unit and integration tests.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::DependencyFilter;

/// Maven dependency scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a scope string is not one Maven knows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown dependency scope \"{0}\"")]
pub struct InvalidScope(pub String);

impl FromStr for Scope {
    type Err = InvalidScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compile" => Ok(Scope::Compile),
            "provided" => Ok(Scope::Provided),
            "runtime" => Ok(Scope::Runtime),
            "test" => Ok(Scope::Test),
            "system" => Ok(Scope::System),
            "import" => Ok(Scope::Import),
            _ => Err(InvalidScope(s.to_string())),
        }
    }
}

/// A reference to an upstream archive declared as a dependency of the project.
///
/// Consumed, never stored: it is read from the build descriptor, filtered and
/// handed to the unpacker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyArchive {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Declared `<type>`; `jar` when the descriptor omits it.
    pub archive_type: String,
    pub scope: Scope,
    pub classifier: Option<String>,
}

impl DependencyArchive {
    /// `group:artifact:type[:classifier]:version`
    pub fn coordinate(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.archive_type, classifier, self.version
            ),
            None => format!(
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.archive_type, self.version
            ),
        }
    }

    /// File name of the archive inside a Maven-layout repository.
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.archive_type
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.archive_type),
        }
    }
}

/// Everything the unpacker needs for one invocation.
#[derive(Debug, Clone)]
pub struct UnpackRequest {
    pub output_directory: PathBuf,
    /// Archives that already passed `filter`.
    pub archives: Vec<DependencyArchive>,
    pub filter: DependencyFilter,
}

/// Coordinates the unpacker extracted or left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackReport {
    pub unpacked: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Error)]
pub enum UnpackError {
    #[error("dependency {0} could not be resolved")]
    Unresolved(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to extract archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Extracts dependency archives into a directory.
///
/// Implemented by [`crate::unpack::LocalRepositoryUnpacker`] and by mocks in
/// testing.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ArchiveUnpacker {
    /// Extract every archive in `request` into `request.output_directory`.
    fn unpack(&self, request: &UnpackRequest) -> Result<UnpackReport, UnpackError>;
}
