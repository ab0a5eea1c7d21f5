//! Maven-2 repository layout and the writer that materializes records in it.

use std::path::{Path, PathBuf};

use hoist_core::artifact::ArtifactRecord;
use hoist_core::config::ChecksumAlgorithm;
use hoist_util::errors::HoistError;

use crate::checksum;

/// Directory for a coordinate, relative to the repository root.
///
/// `org.acme:core:1.0` becomes `org/acme/core/1.0`.
pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> PathBuf {
    group_path(group, artifact).join(version)
}

/// Directory holding every version of an artifact, relative to the root.
pub fn group_path(group: &str, artifact: &str) -> PathBuf {
    let mut path: PathBuf = group.split('.').collect();
    path.push(artifact);
    path
}

/// `artifactId-version[-classifier].extension`
pub fn file_name(record: &ArtifactRecord) -> String {
    match &record.classifier {
        Some(c) => format!(
            "{}-{}-{c}.{}",
            record.artifact_id, record.version, record.extension
        ),
        None => format!("{}-{}.{}", record.artifact_id, record.version, record.extension),
    }
}

/// Entry path of a record relative to the repository root.
pub fn entry_path(record: &ArtifactRecord) -> PathBuf {
    coordinate_path(&record.group_id, &record.artifact_id, &record.version).join(file_name(record))
}

/// Copies records into a repository tree and writes their checksum sidecars.
#[derive(Debug, Clone)]
pub struct LayoutWriter {
    algorithms: Vec<ChecksumAlgorithm>,
}

impl LayoutWriter {
    pub fn new(algorithms: Vec<ChecksumAlgorithm>) -> Self {
        Self { algorithms }
    }

    pub fn algorithms(&self) -> &[ChecksumAlgorithm] {
        &self.algorithms
    }

    /// Write one record under `root`, replacing whatever is already there.
    ///
    /// Returns the artifact path followed by its sidecars, all relative to
    /// `root`. A record without a file is a caller bug and reported as an
    /// error rather than skipped.
    pub fn write(&self, root: &Path, record: &ArtifactRecord) -> Result<Vec<PathBuf>, HoistError> {
        let rel = entry_path(record);
        let dest = root.join(&rel);
        let src = record.file().ok_or_else(|| HoistError::Generic {
            message: format!("Artifact {record} has no file to stage"),
        })?;

        hoist_util::fs::copy_replacing(src, &dest).map_err(|e| HoistError::staging(&dest, e))?;
        tracing::debug!("staged {} -> {}", src.display(), dest.display());

        let mut written = vec![rel];
        if !record.no_checksum {
            for sidecar in checksum::write_sidecars(&dest, &self.algorithms)? {
                if let Ok(r) = sidecar.strip_prefix(root) {
                    written.push(r.to_path_buf());
                }
            }
        }
        Ok(written)
    }
}
