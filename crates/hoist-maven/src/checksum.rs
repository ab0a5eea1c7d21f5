//! Checksum sidecars (`.md5`, `.sha1`, `.sha256`, `.sha512`).

use std::fs;
use std::path::{Path, PathBuf};

use hoist_core::config::ChecksumAlgorithm;
use hoist_util::errors::HoistError;
use hoist_util::hash;

/// Every algorithm a sidecar may be written with.
pub const ALL_ALGORITHMS: [ChecksumAlgorithm; 4] = [
    ChecksumAlgorithm::Md5,
    ChecksumAlgorithm::Sha1,
    ChecksumAlgorithm::Sha256,
    ChecksumAlgorithm::Sha512,
];

/// Hex digest of a file.
pub fn digest_file(algo: ChecksumAlgorithm, path: &Path) -> std::io::Result<String> {
    match algo {
        ChecksumAlgorithm::Md5 => hash::md5_file(path),
        ChecksumAlgorithm::Sha1 => hash::sha1_file(path),
        ChecksumAlgorithm::Sha256 => hash::sha256_file(path),
        ChecksumAlgorithm::Sha512 => hash::sha512_file(path),
    }
}

/// Hex digest of in-memory data.
pub fn digest_bytes(algo: ChecksumAlgorithm, data: &[u8]) -> String {
    match algo {
        ChecksumAlgorithm::Md5 => hash::md5_bytes(data),
        ChecksumAlgorithm::Sha1 => hash::sha1_bytes(data),
        ChecksumAlgorithm::Sha256 => hash::sha256_bytes(data),
        ChecksumAlgorithm::Sha512 => hash::sha512_bytes(data),
    }
}

/// `path` with the algorithm's extension appended (`a.jar` -> `a.jar.sha1`).
pub fn sidecar_path(path: &Path, algo: ChecksumAlgorithm) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(algo.extension());
    PathBuf::from(name)
}

/// The algorithm a sidecar file belongs to, judged by its extension.
pub fn sidecar_algorithm(path: &Path) -> Option<ChecksumAlgorithm> {
    let ext = path.extension()?.to_str()?;
    ALL_ALGORITHMS.into_iter().find(|a| a.extension() == ext)
}

/// Write one sidecar per algorithm next to `path`: lowercase hex, no newline.
///
/// Returns the sidecar paths in algorithm order.
pub fn write_sidecars(
    path: &Path,
    algorithms: &[ChecksumAlgorithm],
) -> Result<Vec<PathBuf>, HoistError> {
    let mut written = Vec::with_capacity(algorithms.len());
    for &algo in algorithms {
        let hex = digest_file(algo, path).map_err(|e| HoistError::staging(path, e))?;
        let sidecar = sidecar_path(path, algo);
        fs::write(&sidecar, hex).map_err(|e| HoistError::staging(&sidecar, e))?;
        written.push(sidecar);
    }
    Ok(written)
}

/// A sidecar whose recorded digest does not match its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub file: PathBuf,
    pub algorithm: ChecksumAlgorithm,
    pub expected: String,
    pub actual: String,
}

/// Recompute the digest for `sidecar` and compare it with its content.
///
/// Returns `Ok(None)` when it matches.
pub fn verify_sidecar(sidecar: &Path) -> miette::Result<Option<ChecksumMismatch>> {
    let Some(algo) = sidecar_algorithm(sidecar) else {
        return Ok(None);
    };
    let file = sidecar.with_extension("");
    let recorded = fs::read_to_string(sidecar).map_err(HoistError::Io)?;
    let expected = extract_hash(&recorded);

    let actual = if file.is_file() {
        digest_file(algo, &file).map_err(HoistError::Io)?
    } else {
        String::new()
    };

    if actual.eq_ignore_ascii_case(&expected) {
        tracing::debug!("{} ok for {}", algo.extension(), file.display());
        Ok(None)
    } else {
        Ok(Some(ChecksumMismatch {
            file,
            algorithm: algo,
            expected,
            actual,
        }))
    }
}

/// Extract the hex hash from a checksum file.
///
/// Checksum files may contain just the hash, or `hash  filename`.
pub fn extract_hash(content: &str) -> String {
    content.split_whitespace().next().unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_hash_simple() {
        assert_eq!(extract_hash("abc123\n"), "abc123");
    }

    #[test]
    fn extract_hash_with_filename() {
        assert_eq!(extract_hash("abc123  my-lib-1.0.jar\n"), "abc123");
    }

    #[test]
    fn sidecar_path_appends_extension() {
        assert_eq!(
            sidecar_path(Path::new("/r/a-1.0.jar"), ChecksumAlgorithm::Sha1),
            PathBuf::from("/r/a-1.0.jar.sha1")
        );
    }

    #[test]
    fn sidecar_algorithm_by_extension() {
        assert_eq!(
            sidecar_algorithm(Path::new("a.jar.md5")),
            Some(ChecksumAlgorithm::Md5)
        );
        assert_eq!(sidecar_algorithm(Path::new("a.jar")), None);
    }

    #[test]
    fn md5_of_hello_world() {
        assert_eq!(
            digest_bytes(ChecksumAlgorithm::Md5, b"hello world"),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }
}
