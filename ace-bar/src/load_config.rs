//! `load_config`: resolves the [`BuildConfig`] every goal runs with.
//!
//! Sources, lowest precedence first: built-in defaults derived from the
//! project directory, an optional YAML file, then the `ACE_WORKSPACE` and
//! `ACE_RETAIN_WORKSPACE` environment variables. Command line flags are
//! applied on top by the CLI.
//!
//! # Errors
//! Every failure is an `anyhow::Error` naming the offending file, key or
//! variable, surfaced unchanged at the CLI boundary.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ace_bar_core::contract::Scope;
use ace_bar_core::filter::{type_tokens, DependencyFilter, DEFAULT_ARCHIVE_TYPES};
use ace_bar_core::prepare::PrepareConfig;
use ace_bar_core::unpack::MARKERS_DIRECTORY;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info};

pub const WORKSPACE_ENV: &str = "ACE_WORKSPACE";
pub const RETAIN_WORKSPACE_ENV: &str = "ACE_RETAIN_WORKSPACE";

/// The YAML file as written; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StaticConfig {
    project_directory: Option<PathBuf>,
    build_directory: Option<PathBuf>,
    workspace: Option<PathBuf>,
    retain_workspace: Option<bool>,
    dependency_archive_types: Option<Vec<String>>,
    dependency_scope: Option<String>,
    local_repository: Option<PathBuf>,
}

/// Fully resolved configuration shared by all goals.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    pub project_directory: PathBuf,
    pub build_directory: PathBuf,
    pub workspace: PathBuf,
    pub retain_workspace: bool,
    pub dependency_archive_types: Vec<String>,
    pub dependency_scope: Scope,
    pub local_repository: PathBuf,
}

impl BuildConfig {
    /// Defaults for a project rooted at `project_directory`.
    pub fn for_project(project_directory: impl Into<PathBuf>) -> Self {
        let project_directory = project_directory.into();
        let build_directory = project_directory.join("target");
        Self {
            workspace: build_directory.join("ace").join("workspace"),
            build_directory,
            project_directory,
            retain_workspace: true,
            dependency_archive_types: vec![DEFAULT_ARCHIVE_TYPES.to_string()],
            dependency_scope: Scope::Compile,
            local_repository: default_local_repository(),
        }
    }

    pub fn markers_directory(&self) -> PathBuf {
        self.build_directory.join(MARKERS_DIRECTORY)
    }

    pub fn filter(&self) -> DependencyFilter {
        DependencyFilter::from_type_entries(&self.dependency_archive_types, self.dependency_scope)
    }

    pub fn prepare_config(&self) -> PrepareConfig {
        PrepareConfig {
            workspace: self.workspace.clone(),
            markers_directory: self.markers_directory(),
            filter: self.filter(),
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            project_directory = %self.project_directory.display(),
            workspace = %self.workspace.display(),
            retain_workspace = self.retain_workspace,
            "Loaded build configuration"
        );
        debug!(?self, "Build configuration (full debug)");
    }

    /// `ACE_WORKSPACE` and `ACE_RETAIN_WORKSPACE` win over the file.
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(workspace) = env::var(WORKSPACE_ENV) {
            info!(workspace = %workspace, "ACE_WORKSPACE found in env");
            self.workspace = PathBuf::from(workspace);
        }
        if let Ok(retain) = env::var(RETAIN_WORKSPACE_ENV) {
            self.retain_workspace = retain.trim().parse::<bool>().map_err(|e| {
                error!(error = ?e, value = %retain, "ACE_RETAIN_WORKSPACE must be true or false");
                anyhow::anyhow!("{RETAIN_WORKSPACE_ENV} must be true or false, got {retain:?}")
            })?;
        }
        Ok(())
    }
}

fn default_local_repository() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}

/// Loads a YAML config file, fills in defaults and applies env overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BuildConfig> {
    resolve_config(Some(path.as_ref()), None)
}

/// Resolves the configuration for one goal: optional YAML file, then
/// `project_dir` from the command line, then defaults, then env overrides.
/// Defaults derived from the project directory follow `project_dir`.
pub fn resolve_config(path: Option<&Path>, project_dir: Option<PathBuf>) -> Result<BuildConfig> {
    let mut static_conf = match path {
        Some(path) => read_static(path)?,
        None => StaticConfig::default(),
    };
    if project_dir.is_some() {
        static_conf.project_directory = project_dir;
    }

    let mut config = merge(static_conf)?;
    config.apply_env()?;
    config.trace_loaded();
    Ok(config)
}

fn read_static(path: &Path) -> Result<StaticConfig> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML {}: {e}", path.display())
    })
}

fn merge(file: StaticConfig) -> Result<BuildConfig> {
    let project_directory = file.project_directory.unwrap_or_else(|| PathBuf::from("."));
    let mut config = BuildConfig::for_project(project_directory);

    if let Some(build_directory) = file.build_directory {
        config.workspace = build_directory.join("ace").join("workspace");
        config.build_directory = build_directory;
    }
    if let Some(workspace) = file.workspace {
        config.workspace = workspace;
    }
    if let Some(retain) = file.retain_workspace {
        config.retain_workspace = retain;
    }
    if let Some(types) = file.dependency_archive_types {
        config.dependency_archive_types = type_tokens(types);
    }
    if let Some(scope) = file.dependency_scope {
        config.dependency_scope = scope
            .parse::<Scope>()
            .with_context(|| format!("Invalid dependency_scope {scope:?}"))?;
    }
    if let Some(repo) = file.local_repository {
        config.local_repository = repo;
    }
    Ok(config)
}
