//!
//! This module implements the CLI interface for ace-bar: command parsing,
//! argument-to-config mapping and user-visible output for the three BAR
//! workspace goals.
//!
//! All core logic (descriptors, validation, unpacking, cleaning) lives in the
//! [`ace-bar-core`] crate. This module is strictly CLI glue.
//!
//! ## How To Use
//! - For command-line users: use the installed `ace-bar` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`ace-bar-core`]: ../../ace-bar-core/
use std::path::PathBuf;

use ace_bar_core::clean::{clean, CleanOutcome};
use ace_bar_core::descriptor::read_pom_descriptor;
use ace_bar_core::prepare::prepare;
use ace_bar_core::unpack::LocalRepositoryUnpacker;
use ace_bar_core::validate::{validate, validate_project_dir};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::load_config::{resolve_config, BuildConfig};

/// CLI for ace-bar: BAR build workspace goals for ACE/IIB projects.
#[derive(Parser)]
#[clap(
    name = "ace-bar",
    version,
    about = "Validate ACE projects and prepare or clean their BAR build workspace"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that directory name, .project name and artifactId agree
    ValidateProject {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Project root holding .project and pom.xml
        #[clap(long)]
        project_dir: Option<PathBuf>,
        /// Artifact id to compare against; read from pom.xml when omitted
        #[clap(long)]
        artifact_id: Option<String>,
    },
    /// Create the workspace and unpack the project's dependency archives into it
    PrepareBarBuildWorkspace {
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(long)]
        project_dir: Option<PathBuf>,
        /// Override the workspace directory
        #[clap(long)]
        workspace: Option<PathBuf>,
        /// Maven-layout repository the archives are resolved from
        #[clap(long)]
        local_repository: Option<PathBuf>,
    },
    /// Delete the workspace unless it is retained
    CleanBarBuildWorkspace {
        #[clap(long)]
        config: Option<PathBuf>,
        #[clap(long)]
        project_dir: Option<PathBuf>,
        #[clap(long)]
        workspace: Option<PathBuf>,
        /// Delete the workspace even though retain_workspace defaults to true
        #[clap(long)]
        no_retain: bool,
    },
}

/// CLI logic entrypoint for integration tests and main()
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::ValidateProject {
            config,
            project_dir,
            artifact_id,
        } => {
            let config = resolve_config(config.as_deref(), project_dir)?;
            tracing::info!(command = "validate-project", "Validating project");
            run_validate(&config, artifact_id.as_deref())
        }
        Commands::PrepareBarBuildWorkspace {
            config,
            project_dir,
            workspace,
            local_repository,
        } => {
            let mut config = resolve_config(config.as_deref(), project_dir)?;
            if let Some(workspace) = workspace {
                config.workspace = workspace;
            }
            if let Some(repo) = local_repository {
                config.local_repository = repo;
            }
            tracing::info!(command = "prepare-bar-build-workspace", "Preparing workspace");
            run_prepare(&config)
        }
        Commands::CleanBarBuildWorkspace {
            config,
            project_dir,
            workspace,
            no_retain,
        } => {
            let mut config = resolve_config(config.as_deref(), project_dir)?;
            if let Some(workspace) = workspace {
                config.workspace = workspace;
            }
            if no_retain {
                config.retain_workspace = false;
            }
            tracing::info!(command = "clean-bar-build-workspace", "Cleaning workspace");
            run_clean(&config);
            Ok(())
        }
    }
}

fn run_validate(config: &BuildConfig, artifact_id: Option<&str>) -> Result<()> {
    let dir = &config.project_directory;
    let identity = match artifact_id {
        Some(id) => validate(dir, id),
        None => validate_project_dir(dir),
    }
    .context("Project validation failed")?;

    println!(
        "Project '{}' validated ({:?})",
        identity.directory_name, identity.kind
    );
    Ok(())
}

fn run_prepare(config: &BuildConfig) -> Result<()> {
    let pom = read_pom_descriptor(&config.project_directory)
        .context("Could not read the project's pom.xml")?;
    let unpacker =
        LocalRepositoryUnpacker::new(&config.local_repository, config.markers_directory());

    let outcome = prepare(&config.prepare_config(), &pom.dependencies, &unpacker)
        .context("Preparing the BAR build workspace failed")?;

    for warning in outcome.warnings() {
        eprintln!("[WARN] {warning}");
    }
    println!(
        "Prepared workspace {}: {} unpacked, {} up to date",
        config.workspace.display(),
        outcome.report.unpacked.len(),
        outcome.report.skipped.len()
    );
    for coordinate in &outcome.report.unpacked {
        println!("  unpacked {coordinate}");
    }
    Ok(())
}

fn run_clean(config: &BuildConfig) {
    match clean(&config.workspace, config.retain_workspace) {
        CleanOutcome::Retained => {
            println!("Workspace retained: {}", config.workspace.display())
        }
        CleanOutcome::Cleaned => println!("Workspace cleaned: {}", config.workspace.display()),
        CleanOutcome::NotPresent => {
            println!("Workspace not present: {}", config.workspace.display())
        }
        CleanOutcome::DeleteFailed { path, error } => {
            eprintln!("[WARN] could not delete workspace {}: {error}", path.display())
        }
    }
}
