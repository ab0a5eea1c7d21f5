//! Operation: recompute every checksum sidecar in a staged tree.

use std::path::Path;

use hoist_maven::checksum::{self, ChecksumMismatch};
use hoist_maven::staging::list_files;
use hoist_util::errors::HoistError;
use hoist_util::progress::{status, status_warn};

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    /// Files that are not sidecars.
    pub files: usize,
    pub sidecars: usize,
    pub mismatches: Vec<ChecksumMismatch>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

pub fn verify(dir: &Path) -> miette::Result<VerifyReport> {
    if !dir.is_dir() {
        return Err(HoistError::Generic {
            message: format!("{} is not a directory", dir.display()),
        }
        .into());
    }

    let mut report = VerifyReport::default();
    for rel in list_files(dir)? {
        if checksum::sidecar_algorithm(&rel).is_none() {
            report.files += 1;
            continue;
        }
        report.sidecars += 1;
        if let Some(m) = checksum::verify_sidecar(&dir.join(&rel))? {
            status_warn(
                "Mismatch",
                &format!(
                    "{} {}: expected {}, got {}",
                    m.algorithm.extension(),
                    m.file.display(),
                    m.expected,
                    if m.actual.is_empty() { "<missing>" } else { &m.actual }
                ),
            );
            report.mismatches.push(m);
        }
    }

    if report.is_clean() {
        status(
            "Verified",
            &format!("{} files, {} checksums", report.files, report.sidecars),
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_core::config::ChecksumAlgorithm;
    use std::fs;

    #[test]
    fn clean_tree_verifies() {
        let dir = tempfile::TempDir::new().unwrap();
        let jar = dir.path().join("a-1.0.jar");
        fs::write(&jar, b"jar").unwrap();
        checksum::write_sidecars(&jar, &[ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha1])
            .unwrap();

        let report = verify(dir.path()).unwrap();
        assert_eq!(report.files, 1);
        assert_eq!(report.sidecars, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn orphan_sidecar_is_a_mismatch() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("gone.jar.sha1"), "abc").unwrap();

        let report = verify(dir.path()).unwrap();
        assert_eq!(report.mismatches.len(), 1);
        assert!(report.mismatches[0].actual.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(verify(&dir.path().join("nope")).is_err());
    }
}
