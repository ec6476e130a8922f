//! Default [`ArchiveUnpacker`]: resolves archives from a Maven-layout local
//! repository and extracts them with marker-file bookkeeping, the way
//! `dependency:unpack-dependencies` does.
//!
//! A marker file is written per extracted archive. An archive whose marker is
//! at least as new as the archive itself is not extracted again.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::contract::{ArchiveUnpacker, DependencyArchive, UnpackError, UnpackReport, UnpackRequest};

/// Directory name the markers live under, inside the build directory.
pub const MARKERS_DIRECTORY: &str = "dependency-maven-plugin-markers";

pub struct LocalRepositoryUnpacker {
    repository: PathBuf,
    markers_directory: PathBuf,
}

impl LocalRepositoryUnpacker {
    pub fn new(repository: impl Into<PathBuf>, markers_directory: impl Into<PathBuf>) -> Self {
        Self {
            repository: repository.into(),
            markers_directory: markers_directory.into(),
        }
    }

    /// `<repo>/<group as path>/<artifact>/<version>/<file name>`
    pub fn resolve(&self, archive: &DependencyArchive) -> Result<PathBuf, UnpackError> {
        let mut path = self.repository.clone();
        for segment in archive.group_id.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(&archive.artifact_id);
        path.push(&archive.version);
        path.push(archive.file_name());

        if path.is_file() {
            Ok(path)
        } else {
            warn!(coordinate = %archive.coordinate(), path = %path.display(), "Archive not found in local repository");
            Err(UnpackError::Unresolved(archive.coordinate()))
        }
    }

    pub fn marker_path(&self, archive: &DependencyArchive) -> PathBuf {
        self.markers_directory
            .join(format!("{}.marker", archive.coordinate().replace(':', "-")))
    }

    fn is_up_to_date(&self, marker: &Path, archive_file: &Path) -> bool {
        let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
        match (modified(marker), modified(archive_file)) {
            (Some(marker_time), Some(archive_time)) => marker_time >= archive_time,
            _ => false,
        }
    }

    fn write_marker(&self, marker: &Path) -> Result<(), UnpackError> {
        fs::create_dir_all(&self.markers_directory).map_err(|source| UnpackError::Io {
            path: self.markers_directory.clone(),
            source,
        })?;
        File::create(marker).map_err(|source| UnpackError::Io {
            path: marker.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

impl ArchiveUnpacker for LocalRepositoryUnpacker {
    fn unpack(&self, request: &UnpackRequest) -> Result<UnpackReport, UnpackError> {
        info!(
            output_directory = %request.output_directory.display(),
            archives = request.archives.len(),
            include_types = ?request.filter.include_types,
            include_scope = %request.filter.include_scope,
            "Unpacking dependency archives"
        );
        let mut report = UnpackReport::default();

        for archive in &request.archives {
            let coordinate = archive.coordinate();
            let file = self.resolve(archive)?;
            let marker = self.marker_path(archive);

            if self.is_up_to_date(&marker, &file) {
                debug!(coordinate = %coordinate, "Marker is current, skipping");
                report.skipped.push(coordinate);
                continue;
            }

            extract(&file, &request.output_directory)?;
            self.write_marker(&marker)?;
            info!(coordinate = %coordinate, "Unpacked dependency archive");
            report.unpacked.push(coordinate);
        }

        Ok(report)
    }
}

/// Extracts every entry of the zip at `archive` below `target`.
/// Entries that would land outside `target` are skipped.
pub fn extract(archive: &Path, target: &Path) -> Result<(), UnpackError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| UnpackError::Io { path, source }
    };
    let zip_err = |source: zip::result::ZipError| UnpackError::Archive {
        path: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(io_err(archive))?;
    let mut zip = ZipArchive::new(file).map_err(zip_err)?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(zip_err)?;
        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = %entry.name(), archive = %archive.display(), "Skipping entry outside the output directory");
            continue;
        };
        let destination = target.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&destination).map_err(io_err(&destination))?;
            continue;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        let mut out = File::create(&destination).map_err(io_err(&destination))?;
        io::copy(&mut entry, &mut out).map_err(io_err(&destination))?;
    }

    Ok(())
}
