//! Readers for the two descriptors every ACE project carries at its root:
//! the Eclipse `.project` file and the Maven `pom.xml`.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, error};

use crate::contract::{DependencyArchive, InvalidScope, Scope};

pub const PROJECT_FILE: &str = ".project";
pub const POM_FILE: &str = "pom.xml";

const APPLICATION_NATURE: &str = "applicationNature";
const SHARED_LIBRARY_NATURE: &str = "sharedLibraryNature";
const LIBRARY_NATURE: &str = "libraryNature";

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not well-formed XML: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("{} has no <{element}> element", path.display())]
    MissingElement { path: PathBuf, element: &'static str },

    #[error(transparent)]
    InvalidScope(#[from] InvalidScope),
}

/// What kind of toolkit project a `.project` describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Application,
    Library,
    SharedLibrary,
    Other,
}

/// Parsed Eclipse `.project` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    pub natures: Vec<String>,
    /// Referenced projects (`<projects><project>`).
    pub references: Vec<String>,
}

impl ProjectDescriptor {
    pub fn parse(content: &str) -> Result<Self, DescriptorError> {
        Self::parse_at(content, Path::new(PROJECT_FILE))
    }

    fn parse_at(content: &str, path: &Path) -> Result<Self, DescriptorError> {
        let doc = Document::parse(content).map_err(|source| DescriptorError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        let root = doc.root_element();

        let name = child_text(root, "name").ok_or_else(|| DescriptorError::MissingElement {
            path: path.to_path_buf(),
            element: "name",
        })?;

        Ok(Self {
            name,
            natures: grandchild_texts(root, "natures", "nature"),
            references: grandchild_texts(root, "projects", "project"),
        })
    }

    pub fn kind(&self) -> ProjectKind {
        if self.has_nature(APPLICATION_NATURE) {
            ProjectKind::Application
        } else if self.has_nature(SHARED_LIBRARY_NATURE) {
            ProjectKind::SharedLibrary
        } else if self.has_nature(LIBRARY_NATURE) {
            ProjectKind::Library
        } else {
            ProjectKind::Other
        }
    }

    pub fn is_application(&self) -> bool {
        self.kind() == ProjectKind::Application
    }

    /// Shared libraries count as libraries.
    pub fn is_library(&self) -> bool {
        matches!(self.kind(), ProjectKind::Library | ProjectKind::SharedLibrary)
    }

    fn has_nature(&self, suffix: &str) -> bool {
        self.natures
            .iter()
            .any(|n| n.rsplit('.').next() == Some(suffix))
    }
}

/// Declared `<packaging>` of a pom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packaging {
    Jar,
    Pom,
    Zip,
    Bar,
    Other(String),
}

impl Packaging {
    fn from_declared(value: Option<&str>) -> Self {
        match value.map(str::trim).unwrap_or("") {
            "" | "jar" => Packaging::Jar,
            "pom" => Packaging::Pom,
            "zip" => Packaging::Zip,
            "bar" => Packaging::Bar,
            other => Packaging::Other(other.to_string()),
        }
    }
}

/// Parsed Maven `pom.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomDescriptor {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
    pub packaging: Packaging,
    pub dependencies: Vec<DependencyArchive>,
}

impl PomDescriptor {
    pub fn parse(content: &str) -> Result<Self, DescriptorError> {
        Self::parse_at(content, Path::new(POM_FILE))
    }

    fn parse_at(content: &str, path: &Path) -> Result<Self, DescriptorError> {
        let doc = Document::parse(content).map_err(|source| DescriptorError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        let root = doc.root_element();
        let parent = child(root, "parent");

        let artifact_id =
            child_text(root, "artifactId").ok_or_else(|| DescriptorError::MissingElement {
                path: path.to_path_buf(),
                element: "artifactId",
            })?;
        let group_id =
            child_text(root, "groupId").or_else(|| parent.and_then(|p| child_text(p, "groupId")));
        let version =
            child_text(root, "version").or_else(|| parent.and_then(|p| child_text(p, "version")));
        let packaging = Packaging::from_declared(child_text(root, "packaging").as_deref());

        // Only <project><dependencies>; <dependencyManagement> declares nothing.
        let mut dependencies = Vec::new();
        if let Some(deps) = child(root, "dependencies") {
            for node in deps.children().filter(|n| n.has_tag_name("dependency")) {
                dependencies.push(parse_dependency(node)?);
            }
        }

        Ok(Self {
            group_id,
            artifact_id,
            version,
            packaging,
            dependencies,
        })
    }

    /// `jar` is the default and may be left undeclared.
    pub fn is_jar_packaging(&self) -> bool {
        self.packaging == Packaging::Jar
    }
}

fn parse_dependency(node: Node) -> Result<DependencyArchive, DescriptorError> {
    let scope = match child_text(node, "scope") {
        Some(s) => s.parse::<Scope>()?,
        None => Scope::Compile,
    };
    Ok(DependencyArchive {
        group_id: child_text(node, "groupId").unwrap_or_default(),
        artifact_id: child_text(node, "artifactId").unwrap_or_default(),
        version: child_text(node, "version").unwrap_or_default(),
        archive_type: child_text(node, "type").unwrap_or_else(|| "jar".to_string()),
        scope,
        classifier: child_text(node, "classifier"),
    })
}

pub fn read_project_descriptor(project_dir: &Path) -> Result<ProjectDescriptor, DescriptorError> {
    let path = project_dir.join(PROJECT_FILE);
    let content = read(&path)?;
    let descriptor = ProjectDescriptor::parse_at(&content, &path)?;
    debug!(path = %path.display(), name = %descriptor.name, kind = ?descriptor.kind(), "Read project descriptor");
    Ok(descriptor)
}

pub fn read_pom_descriptor(project_dir: &Path) -> Result<PomDescriptor, DescriptorError> {
    let path = project_dir.join(POM_FILE);
    let content = read(&path)?;
    let descriptor = PomDescriptor::parse_at(&content, &path)?;
    debug!(
        path = %path.display(),
        artifact_id = %descriptor.artifact_id,
        dependencies = descriptor.dependencies.len(),
        "Read build descriptor"
    );
    Ok(descriptor)
}

fn read(path: &Path) -> Result<String, DescriptorError> {
    fs::read_to_string(path).map_err(|source| {
        error!(error = ?source, path = %path.display(), "Failed to read descriptor");
        DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

fn child_text(node: Node, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn grandchild_texts(node: Node, outer: &str, inner: &str) -> Vec<String> {
    child(node, outer)
        .map(|o| {
            o.children()
                .filter(|c| c.has_tag_name(inner))
                .filter_map(|c| c.text())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
