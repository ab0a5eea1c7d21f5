//! The staging repository: a disposable local directory in Maven layout.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use walkdir::WalkDir;

use hoist_core::artifact::ArtifactRecord;
use hoist_core::config::ChecksumAlgorithm;
use hoist_util::errors::HoistError;

use crate::checksum::{self, ChecksumMismatch};
use crate::layout::{self, LayoutWriter};
use crate::metadata::{self, MavenMetadata, METADATA_FILE};

/// What one `stage` call wrote, relative to the staging root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingReport {
    /// Artifact files and their sidecars, in record order.
    pub files: Vec<PathBuf>,
    /// `maven-metadata.xml` files and their sidecars.
    pub metadata: Vec<PathBuf>,
    pub records: usize,
}

/// A local directory materializing the Maven-2 layout.
#[derive(Debug, Clone)]
pub struct StagingRepository {
    root: PathBuf,
    writer: LayoutWriter,
}

impl StagingRepository {
    /// Open (creating if needed) a staging root.
    pub fn open(
        root: impl Into<PathBuf>,
        algorithms: Vec<ChecksumAlgorithm>,
    ) -> Result<Self, HoistError> {
        let root = root.into();
        hoist_util::fs::ensure_dir(&root).map_err(|e| HoistError::staging(&root, e))?;
        Ok(Self {
            root,
            writer: LayoutWriter::new(algorithms),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove everything under the root, leaving an empty directory.
    pub fn clear(&self) -> Result<(), HoistError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| HoistError::staging(&self.root, e))?;
        }
        fs::create_dir_all(&self.root).map_err(|e| HoistError::staging(&self.root, e))?;
        tracing::debug!("cleared staging root {}", self.root.display());
        Ok(())
    }

    /// Write every record plus its sidecars, then refresh repository metadata
    /// for each `(groupId, artifactId)` touched.
    ///
    /// A failure part-way leaves earlier files in place.
    pub fn stage(&self, records: &[ArtifactRecord]) -> miette::Result<StagingReport> {
        let mut report = StagingReport::default();
        let mut touched: IndexMap<(String, String), Vec<String>> = IndexMap::new();

        for record in records {
            report.files.extend(self.writer.write(&self.root, record)?);
            report.records += 1;
            let versions = touched
                .entry((record.group_id.clone(), record.artifact_id.clone()))
                .or_default();
            if !versions.contains(&record.version) {
                versions.push(record.version.clone());
            }
        }

        let timestamp = metadata::timestamp_now();
        for ((group, artifact), versions) in &touched {
            report
                .metadata
                .extend(self.update_metadata(group, artifact, versions, &timestamp)?);
        }

        Ok(report)
    }

    fn update_metadata(
        &self,
        group: &str,
        artifact: &str,
        versions: &[String],
        timestamp: &str,
    ) -> miette::Result<Vec<PathBuf>> {
        let rel = layout::group_path(group, artifact).join(METADATA_FILE);
        let path = self.root.join(&rel);

        let mut meta = if path.is_file() {
            let xml = fs::read_to_string(&path).map_err(|e| HoistError::staging(&path, e))?;
            metadata::parse_metadata(&xml)?
        } else {
            MavenMetadata::new(group, artifact)
        };
        meta.merge(versions.iter().map(String::as_str), timestamp);

        fs::write(&path, meta.to_xml()?).map_err(|e| HoistError::staging(&path, e))?;

        let mut written = vec![rel];
        for sidecar in checksum::write_sidecars(&path, self.writer.algorithms())? {
            if let Ok(r) = sidecar.strip_prefix(&self.root) {
                written.push(r.to_path_buf());
            }
        }
        Ok(written)
    }

    /// Every regular file under the root, relative and sorted.
    pub fn files(&self) -> miette::Result<Vec<PathBuf>> {
        list_files(&self.root)
    }

    /// Recompute every sidecar under the root; mismatches are returned, not
    /// raised.
    pub fn verify(&self) -> miette::Result<Vec<ChecksumMismatch>> {
        let mut mismatches = Vec::new();
        for rel in self.files()? {
            if checksum::sidecar_algorithm(&rel).is_none() {
                continue;
            }
            if let Some(m) = checksum::verify_sidecar(&self.root.join(&rel))? {
                tracing::warn!(
                    "{} mismatch for {}: expected {}, got {}",
                    m.algorithm.extension(),
                    m.file.display(),
                    m.expected,
                    m.actual
                );
                mismatches.push(m);
            }
        }
        Ok(mismatches)
    }

    /// Total size of the staged tree in bytes.
    pub fn size(&self) -> u64 {
        hoist_util::fs::dir_size(&self.root)
    }
}

/// Regular files under `root`, relative to it and sorted.
pub fn list_files(root: &Path) -> miette::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| HoistError::Generic {
            message: format!("Failed to walk {}: {e}", root.display()),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
