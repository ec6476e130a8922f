use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use ace_bar_core::contract::{
    DependencyArchive, MockArchiveUnpacker, Scope, UnpackReport, UnpackRequest,
};
use ace_bar_core::filter::DependencyFilter;
use ace_bar_core::prepare::{prepare, MarkerCleanup, PrepareConfig};
use ace_bar_core::unpack::{LocalRepositoryUnpacker, MARKERS_DIRECTORY};
use tempfile::tempdir;
use zip::write::SimpleFileOptions;

fn dep(artifact: &str, scope: Scope) -> DependencyArchive {
    DependencyArchive {
        group_id: "com.example.ace".to_string(),
        artifact_id: artifact.to_string(),
        version: "2.0.0".to_string(),
        archive_type: "zip".to_string(),
        scope,
        classifier: None,
    }
}

fn config_under(build_dir: &Path) -> PrepareConfig {
    PrepareConfig {
        workspace: build_dir.join("ace/workspace"),
        markers_directory: build_dir.join(MARKERS_DIRECTORY),
        filter: DependencyFilter::default(),
    }
}

/// Writes a zip into a Maven-layout repository at the path the unpacker resolves.
fn install(repo: &Path, dep: &DependencyArchive, entries: &[(&str, &str)]) {
    let dir = repo
        .join("com/example/ace")
        .join(&dep.artifact_id)
        .join(&dep.version);
    fs::create_dir_all(&dir).expect("create repository dir");
    let file = File::create(dir.join(dep.file_name())).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    for (name, body) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        writer.write_all(body.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish archive");
}

#[test]
fn only_compile_scope_archive_reaches_the_unpacker() {
    let tmp = tempdir().unwrap();
    let config = config_under(tmp.path());
    let deps = vec![
        dep("CompileLib", Scope::Compile),
        dep("TestLib", Scope::Test),
        dep("ProvidedLib", Scope::Provided),
    ];

    let mut unpacker = MockArchiveUnpacker::new();
    let expected_dir = config.workspace.clone();
    unpacker
        .expect_unpack()
        .times(1)
        .withf(move |req: &UnpackRequest| {
            req.output_directory == expected_dir
                && req.archives.len() == 1
                && req.archives[0].artifact_id == "CompileLib"
                && req.filter.include_scope == Scope::Compile
                && req.filter.include_types.contains("zip")
        })
        .returning(|req| {
            Ok(UnpackReport {
                unpacked: req.archives.iter().map(|a| a.coordinate()).collect(),
                skipped: vec![],
            })
        });

    let outcome = prepare(&config, &deps, &unpacker).expect("prepare should succeed");
    assert_eq!(
        outcome.report.unpacked,
        vec!["com.example.ace:CompileLib:zip:2.0.0".to_string()]
    );
    assert!(config.workspace.is_dir());
}

#[test]
fn preparing_twice_over_a_populated_workspace_succeeds() {
    let tmp = tempdir().unwrap();
    let config = config_under(tmp.path());
    fs::create_dir_all(config.workspace.join("Existing")).unwrap();
    fs::write(config.workspace.join("Existing/keep.txt"), "kept").unwrap();

    let mut unpacker = MockArchiveUnpacker::new();
    unpacker
        .expect_unpack()
        .times(2)
        .returning(|_| Ok(UnpackReport::default()));

    prepare(&config, &[], &unpacker).expect("first run");
    prepare(&config, &[], &unpacker).expect("second run");

    assert_eq!(
        fs::read_to_string(config.workspace.join("Existing/keep.txt")).unwrap(),
        "kept"
    );
}

#[test]
fn local_repository_unpack_populates_workspace_and_drops_markers() {
    let tmp = tempdir().unwrap();
    let repo = tmp.path().join("m2");
    let build_dir = tmp.path().join("target");
    let config = config_under(&build_dir);

    let lib = dep("OrderFlowLib", Scope::Compile);
    let helper = dep("TestHelpers", Scope::Test);
    install(
        &repo,
        &lib,
        &[
            ("OrderFlowLib/.project", "<projectDescription><name>OrderFlowLib</name></projectDescription>"),
            ("OrderFlowLib/com/example/Order.msgflow", "<flow/>"),
        ],
    );
    // Not installed on purpose: a test-scoped archive must never be resolved.

    let unpacker = LocalRepositoryUnpacker::new(&repo, &config.markers_directory);
    let outcome = prepare(&config, &[lib.clone(), helper], &unpacker).expect("prepare");

    assert_eq!(outcome.report.unpacked, vec![lib.coordinate()]);
    assert!(matches!(outcome.marker_cleanup, MarkerCleanup::Removed));
    assert!(!config.markers_directory.exists());
    assert!(config
        .workspace
        .join("OrderFlowLib/com/example/Order.msgflow")
        .is_file());

    // Markers were removed, so a rerun extracts again rather than skipping.
    let rerun = prepare(&config, &[lib.clone()], &unpacker).expect("rerun");
    assert_eq!(rerun.report.unpacked, vec![lib.coordinate()]);
}

#[test]
fn unresolvable_compile_dependency_fails_preparation() {
    let tmp = tempdir().unwrap();
    let config = config_under(tmp.path());
    let unpacker = LocalRepositoryUnpacker::new(tmp.path().join("empty-repo"), &config.markers_directory);

    let err = prepare(&config, &[dep("Missing", Scope::Compile)], &unpacker).unwrap_err();
    assert!(err.to_string().contains("com.example.ace:Missing:zip:2.0.0"));
}
