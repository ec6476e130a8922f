use ace_bar::load_config::{load_config, resolve_config, RETAIN_WORKSPACE_ENV, WORKSPACE_ENV};
use ace_bar_core::contract::Scope;
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn clear_env() {
    env::remove_var(WORKSPACE_ENV);
    env::remove_var(RETAIN_WORKSPACE_ENV);
}

fn yaml(content: &str) -> NamedTempFile {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), content).unwrap();
    config_file
}

/// A full static config is read field by field.
#[test]
#[serial]
fn test_load_config_reads_every_key() {
    clear_env();
    let config_file = yaml(
        r#"
project_directory: /work/OrderFlow
build_directory: /work/OrderFlow/out
workspace: /tmp/ace-ws
retain_workspace: false
dependency_archive_types: [zip, bar]
dependency_scope: runtime
local_repository: /opt/m2
"#,
    );

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.project_directory, PathBuf::from("/work/OrderFlow"));
    assert_eq!(config.build_directory, PathBuf::from("/work/OrderFlow/out"));
    assert_eq!(config.workspace, PathBuf::from("/tmp/ace-ws"));
    assert!(!config.retain_workspace);
    assert_eq!(config.dependency_archive_types, vec!["zip", "bar"]);
    assert_eq!(config.dependency_scope, Scope::Runtime);
    assert_eq!(config.local_repository, PathBuf::from("/opt/m2"));
}

#[test]
#[serial]
fn test_empty_config_uses_project_defaults() {
    clear_env();
    let config_file = yaml("project_directory: /work/OrderFlow\n");

    let config = load_config(config_file.path()).unwrap();

    assert_eq!(config.workspace, PathBuf::from("/work/OrderFlow/target/ace/workspace"));
    assert!(config.retain_workspace);
    assert_eq!(config.dependency_scope, Scope::Compile);
}

#[test]
#[serial]
fn test_project_dir_argument_overrides_file() {
    clear_env();
    let config_file = yaml("project_directory: /work/Elsewhere\n");

    let config =
        resolve_config(Some(config_file.path()), Some(PathBuf::from("/work/OrderFlow"))).unwrap();

    assert_eq!(config.project_directory, PathBuf::from("/work/OrderFlow"));
    assert_eq!(config.build_directory, PathBuf::from("/work/OrderFlow/target"));
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_env();
    let config_file = yaml("workspace: /from/file\nretain_workspace: true\n");
    env::set_var(WORKSPACE_ENV, "/from/env");
    env::set_var(RETAIN_WORKSPACE_ENV, "false");

    let config = load_config(config_file.path());
    clear_env();
    let config = config.unwrap();

    assert_eq!(config.workspace, PathBuf::from("/from/env"));
    assert!(!config.retain_workspace);
}

#[test]
#[serial]
fn test_invalid_retain_env_is_rejected() {
    clear_env();
    env::set_var(RETAIN_WORKSPACE_ENV, "sometimes");

    let result = resolve_config(None, Some(PathBuf::from("/work/OrderFlow")));
    clear_env();

    let err = result.expect_err("non-boolean retain flag must fail");
    assert!(err.to_string().contains(RETAIN_WORKSPACE_ENV));
}

#[test]
#[serial]
fn test_invalid_yaml_fails_to_parse() {
    clear_env();
    let config_file = yaml("workspace: [unterminated\n");

    let err = load_config(config_file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config YAML"));
}

#[test]
#[serial]
fn test_unknown_key_is_rejected() {
    clear_env();
    let config_file = yaml("workspce: /typo\n");

    assert!(load_config(config_file.path()).is_err());
}
